//! The single-assignment state machine behind every [`Future`](crate::Future).
use crate::{Error, Promise, Scheduler};
use std::{cell::RefCell, fmt};
use tracing::{trace, warn};

type Observer<T> = Box<dyn FnOnce(Result<T, Error>)>;

enum State<T> {
    Pending(Vec<Observer<T>>),
    Settled(Result<T, Error>),
}

/// Holds pending, fulfilled or rejected, and settles at most once.
///
/// Observers are never called inline. Settling (or registering on an already
/// settled cell) defers one task per observer onto the cell's [`Scheduler`],
/// so observers on one cell run in the order they were registered.
///
/// # Examples
///
/// ```
/// use deferred_future::{CompletionCell, Scheduler};
/// use std::{cell::Cell, rc::Rc};
///
/// let scheduler = Scheduler::new();
/// let cell = CompletionCell::new(&scheduler);
/// let seen = Rc::new(Cell::new(0));
/// let sink = seen.clone();
/// cell.on_resolve(move |outcome| sink.set(outcome.unwrap()));
/// cell.fulfill(7);
/// assert_eq!(seen.get(), 0);
/// scheduler.run_until_idle();
/// assert_eq!(seen.get(), 7);
/// ```
pub struct CompletionCell<T> {
    scheduler: Scheduler,
    state: RefCell<State<T>>,
}

impl<T: Clone + 'static> CompletionCell<T> {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            state: RefCell::new(State::Pending(vec![])),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// # Panics
    ///
    /// If the cell is already settled. The earlier outcome is kept.
    pub fn fulfill(&self, value: T) {
        if let Err(err) = self.settle(Ok(value)) {
            panic!("cannot fulfill: {err}");
        }
    }

    /// # Panics
    ///
    /// If the cell is already settled. The earlier outcome is kept.
    pub fn reject(&self, error: Error) {
        if let Err(err) = self.settle(Err(error)) {
            panic!("cannot reject: {err}");
        }
    }

    /// Like [`fulfill`](Self::fulfill) but reports a second settlement as
    /// [`Error::AlreadySettled`].
    pub fn try_fulfill(&self, value: T) -> Result<(), Error> {
        self.settle(Ok(value))
    }

    /// Like [`reject`](Self::reject) but reports a second settlement as
    /// [`Error::AlreadySettled`].
    pub fn try_reject(&self, error: Error) -> Result<(), Error> {
        self.settle(Err(error))
    }

    pub(crate) fn settle(&self, outcome: Result<T, Error>) -> Result<(), Error> {
        let previous = {
            let mut state = self.state.borrow_mut();
            if let State::Settled(_) = *state {
                warn!("settle on an already settled cell ignored");
                return Err(Error::AlreadySettled);
            }
            std::mem::replace(&mut *state, State::Settled(outcome.clone()))
        };
        if let State::Pending(observers) = previous {
            trace!(
                fulfilled = outcome.is_ok(),
                observers = observers.len(),
                "cell settled"
            );
            for observer in observers {
                let outcome = outcome.clone();
                self.scheduler.defer(move || observer(outcome));
            }
        }
        Ok(())
    }

    /// Registers `callback` for the final outcome. On a settled cell the
    /// callback is still deferred, never run here.
    pub fn on_resolve<F>(&self, callback: F)
    where
        F: FnOnce(Result<T, Error>) + 'static,
    {
        let outcome = match &mut *self.state.borrow_mut() {
            State::Pending(observers) => {
                observers.push(Box::new(callback));
                return;
            }
            State::Settled(outcome) => outcome.clone(),
        };
        self.scheduler.defer(move || callback(outcome));
    }

    /// Forwards this cell's outcome into the cell `target` produces for,
    /// without taking it from any other observer.
    pub fn chain(&self, target: Promise<T>) {
        self.on_resolve(move |outcome| target.complete(outcome));
    }

    pub fn outcome(&self) -> Option<Result<T, Error>> {
        match &*self.state.borrow() {
            State::Settled(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(*self.state.borrow(), State::Settled(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for CompletionCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cell = f.debug_struct("CompletionCell");
        match &*self.state.borrow() {
            State::Pending(observers) => cell.field("observers", &observers.len()),
            State::Settled(outcome) => cell.field("outcome", outcome),
        };
        cell.finish()
    }
}
