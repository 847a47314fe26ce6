use crate::{CompletionCell, Error, Promise, Scheduler};
use std::{
    any::Any,
    convert::identity,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

/// A value or error that becomes available at most once, later.
///
/// Observers and combinators never run inside the call that registers them
/// or the call that settles the future. They are deferred onto the
/// [`Scheduler`] the future was created on, and derived futures inherit that
/// scheduler.
///
/// Cloning a `Future` clones the handle, not the outcome: both handles
/// observe the same settlement.
///
/// # Examples
///
/// ```
/// use deferred_future::{Future, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let times = Future::successful(&scheduler, 10).map(|n| format!("{n} times!"));
/// assert_eq!(times.value(), None);
/// scheduler.run_until_idle();
/// assert_eq!(times.value(), Some(Ok("10 times!".to_string())));
/// ```
pub struct Future<T> {
    cell: Rc<CompletionCell<T>>,
}

impl<T: Clone + 'static> Future<T> {
    pub(crate) fn from_cell(cell: Rc<CompletionCell<T>>) -> Self {
        Self { cell }
    }

    /// An already fulfilled future.
    pub fn successful(scheduler: &Scheduler, value: T) -> Self {
        let (promise, future) = Promise::new(scheduler);
        promise.resolve(value);
        future
    }

    /// An already rejected future.
    pub fn failed(scheduler: &Scheduler, err: Error) -> Self {
        let (promise, future) = Promise::new(scheduler);
        promise.reject(err);
        future
    }

    /// Runs `computation` on a later turn of `scheduler` and settles with its
    /// result. A panic rejects with [`Error::Panicked`].
    ///
    /// ```
    /// use deferred_future::{Error, Future, Scheduler};
    ///
    /// let scheduler = Scheduler::new();
    /// let boom = Future::<i32>::create(&scheduler, || Err(Error::msg("boom")));
    /// assert_eq!(boom.wait(), Some(Err(Error::msg("boom"))));
    /// ```
    pub fn create<F>(scheduler: &Scheduler, computation: F) -> Self
    where
        F: FnOnce() -> Result<T, Error> + 'static,
    {
        let (promise, future) = Promise::new(scheduler);
        scheduler.defer(move || {
            promise.complete(catch_panic(computation).and_then(identity));
        });
        future
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.cell.scheduler()
    }

    /// The outcome, if settled. Registers nothing.
    pub fn value(&self) -> Option<Result<T, Error>> {
        self.cell.outcome()
    }

    pub fn is_completed(&self) -> bool {
        self.cell.is_settled()
    }

    /// Runs this future's scheduler one task at a time until the future
    /// settles or the queue runs dry, then returns the outcome if there is
    /// one. Observers queued behind the settlement may not have run yet.
    pub fn wait(&self) -> Option<Result<T, Error>> {
        while !self.cell.is_settled() && self.scheduler().run_one() {}
        self.value()
    }

    pub fn on_complete<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(Result<T, Error>) + 'static,
    {
        self.cell.on_resolve(callback);
        self
    }

    pub fn on_success<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(T) + 'static,
    {
        self.cell.on_resolve(move |outcome| {
            if let Ok(value) = outcome {
                callback(value)
            }
        });
        self
    }

    pub fn on_failure<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(Error) + 'static,
    {
        self.cell.on_resolve(move |outcome| {
            if let Err(err) = outcome {
                callback(err)
            }
        });
        self
    }

    /// New future settled by `rule` once this one settles.
    fn derive<U, F>(&self, rule: F) -> Future<U>
    where
        U: Clone + 'static,
        F: FnOnce(Result<T, Error>, Promise<U>) + 'static,
    {
        let (promise, derived) = Promise::new(self.scheduler());
        self.cell.on_resolve(move |outcome| rule(outcome, promise));
        derived
    }

    /// Applies `mapping` to a success. Failures pass through untouched.
    pub fn map<U, F>(&self, mapping: F) -> Future<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.complete(outcome.and_then(|value| catch_panic(|| mapping(value))))
        })
    }

    /// Like [`map`](Self::map) for a mapping that can fail.
    pub fn try_map<U, F>(&self, mapping: F) -> Future<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.complete(
                outcome.and_then(|value| catch_panic(|| mapping(value)).and_then(identity)),
            )
        })
    }

    /// Monadic bind: the derived future adopts the outcome of the future
    /// `mapping` returns.
    ///
    /// ```
    /// use deferred_future::{Future, Scheduler};
    ///
    /// let scheduler = Scheduler::new();
    /// let s = scheduler.clone();
    /// let times = Future::successful(&scheduler, 10)
    ///     .flat_map(move |n| Future::successful(&s, format!("{n} times!")));
    /// assert_eq!(times.wait(), Some(Ok("10 times!".to_string())));
    /// ```
    pub fn flat_map<U, F>(&self, mapping: F) -> Future<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Future<U> + 'static,
    {
        self.derive(move |outcome, promise| {
            match outcome.and_then(|value| catch_panic(|| mapping(value))) {
                Ok(next) => next.cell.chain(promise),
                Err(err) => promise.reject(err),
            }
        })
    }

    /// Keeps a success only if `predicate` holds; otherwise rejects with
    /// [`Error::NoSuchElement`].
    pub fn filter<F>(&self, predicate: F) -> Future<T>
    where
        F: FnOnce(&T) -> bool + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.complete(outcome.and_then(|value| {
                match catch_panic(|| predicate(&value)) {
                    Ok(true) => Ok(value),
                    Ok(false) => Err(Error::NoSuchElement),
                    Err(err) => Err(err),
                }
            }))
        })
    }

    /// Turns a failure into a success. A success passes through and
    /// `recovery` is never called.
    pub fn recover<F>(&self, recovery: F) -> Future<T>
    where
        F: FnOnce(Error) -> T + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.complete(outcome.or_else(|err| catch_panic(|| recovery(err))))
        })
    }

    /// Rewrites either side of the outcome while keeping its classification:
    /// a success goes through `on_success` (whose `Err` rejects), a failure is
    /// replaced by `on_failure(err)`.
    pub fn transform<U, S, F>(&self, on_success: S, on_failure: F) -> Future<U>
    where
        U: Clone + 'static,
        S: FnOnce(T) -> Result<U, Error> + 'static,
        F: FnOnce(Error) -> Error + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.complete(match outcome {
                Ok(value) => catch_panic(|| on_success(value)).and_then(identity),
                Err(err) => Err(match catch_panic(|| on_failure(err)) {
                    Ok(err) | Err(err) => err,
                }),
            })
        })
    }

    /// Runs `callback` for its side effect once this future settles and
    /// returns a handle to the same, unchanged future. This is not a bind;
    /// see [`flat_map`](Self::flat_map).
    ///
    /// `callback` runs in its registration position among this future's
    /// observers.
    pub fn and_then<F>(&self, callback: F) -> Future<T>
    where
        F: FnOnce(Result<T, Error>) + 'static,
    {
        self.cell.on_resolve(callback);
        self.clone()
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future").field("cell", &self.cell).finish()
    }
}

/// Runs a user function, turning a panic into [`Error::Panicked`].
fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, Error> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| Error::Panicked(panic_message(&*payload)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
