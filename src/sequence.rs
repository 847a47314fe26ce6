use crate::{Future, Scheduler};

impl<T: Clone + 'static> Future<T> {
    /// Collects the results of `futures` in input order.
    ///
    /// The futures are bound left to right, so the first failure in input
    /// order is the one reported and later failures are never looked at. No
    /// input yields a successful empty `Vec`.
    ///
    /// For mixed result types, map each input into a shared enum first.
    ///
    /// ```
    /// use deferred_future::{Future, Scheduler};
    ///
    /// let scheduler = Scheduler::new();
    /// let all = Future::sequence(
    ///     &scheduler,
    ///     [1, 2, 3].map(|n| Future::successful(&scheduler, n)),
    /// );
    /// assert_eq!(all.wait(), Some(Ok(vec![1, 2, 3])));
    /// ```
    pub fn sequence<I>(scheduler: &Scheduler, futures: I) -> Future<Vec<T>>
    where
        I: IntoIterator<Item = Future<T>>,
    {
        futures
            .into_iter()
            .fold(Future::successful(scheduler, Vec::new()), |collected, next| {
                collected.flat_map(move |mut values| {
                    next.map(move |value| {
                        values.push(value);
                        values
                    })
                })
            })
    }
}
