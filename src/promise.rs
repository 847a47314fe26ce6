use crate::{CompletionCell, Error, Future, Scheduler};
use std::{fmt, rc::Rc};
use tracing::debug;

/// The producer half of a pending [`Future`]. Settling consumes it, so a
/// producer can settle its future once and only once.
///
/// # Examples
///
/// ```
/// use deferred_future::{Promise, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let (promise, future) = Promise::<String>::new(&scheduler);
/// future.on_success(|value| println!("Received {value:?}"));
/// promise.resolve("Hi".into());
/// assert_eq!(future.wait(), Some(Ok("Hi".to_string())));
/// ```
pub struct Promise<T: Clone + 'static> {
    cell: Rc<CompletionCell<T>>,
}

impl<T: Clone + 'static> Promise<T> {
    pub fn new(scheduler: &Scheduler) -> (Self, Future<T>) {
        let cell = Rc::new(CompletionCell::new(scheduler));
        (
            Self { cell: cell.clone() },
            Future::from_cell(cell),
        )
    }

    pub fn resolve(self, value: T) {
        self.complete(Ok(value))
    }

    pub fn reject(self, err: Error) {
        self.complete(Err(err))
    }

    /// Settles with an outcome that is already a `Result`.
    pub fn complete(self, outcome: Result<T, Error>) {
        // The only other way in is through the public cell API, which a
        // Future never hands out.
        if self.cell.settle(outcome).is_err() {
            debug!("promise target was settled elsewhere");
        }
    }
}

impl<T: Clone + 'static> Drop for Promise<T> {
    /// If this is an unresolved producer, reject with an error.
    fn drop(&mut self) {
        if !self.cell.is_settled() {
            debug!("promise dropped before settling");
            let _ = self.cell.settle(Err(Error::ProducerDropped));
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("cell", &self.cell).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Promise;
    use crate::{Error, Scheduler};

    #[test]
    fn test_promise_resolve() {
        let scheduler = Scheduler::new();
        let (op, op_a) = Promise::<String>::new(&scheduler);
        op.resolve(String::from("🍓"));
        assert!(op_a.is_completed());
        assert_eq!(op_a.wait(), Some(Ok(String::from("🍓"))));
    }

    #[test]
    fn test_promise_reject() {
        let scheduler = Scheduler::new();
        let (a, b) = Promise::<String>::new(&scheduler);
        a.reject(Error::msg("reject!!"));
        assert_eq!(b.wait(), Some(Err(Error::msg("reject!!"))));
    }

    #[test]
    fn test_promise_unresolved() {
        let scheduler = Scheduler::new();
        let (op, op_a) = Promise::<String>::new(&scheduler);
        assert_eq!(op_a.value(), None);
        std::mem::drop(op);
        assert_eq!(op_a.wait(), Some(Err(Error::ProducerDropped)));
    }

    #[test]
    fn test_promise_no_consumer() {
        let scheduler = Scheduler::new();
        let (op, op_a) = Promise::<String>::new(&scheduler);
        std::mem::drop(op_a);
        op.resolve(String::from("🍓"));
        assert_eq!(scheduler.run_until_idle(), 0);
    }
}
