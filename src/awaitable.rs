//! Lets a [`Future`] be `.await`ed by a single-threaded executor.
//!
//! The outcome still arrives through the future's [`Scheduler`](crate::Scheduler),
//! so something has to keep draining it alongside the executor.
use crate::{Error, Future};
use std::{
    cell::RefCell,
    rc::Rc,
    task::{Poll, Waker},
};

/// A `std::future::Future` over the outcome of a [`Future`].
///
/// # Examples
///
/// ```
/// use deferred_future::{Future, Scheduler};
/// use futures::executor::block_on;
///
/// let scheduler = Scheduler::new();
/// let awaitable = Future::create(&scheduler, || Ok("🍓")).into_awaitable();
/// scheduler.run_until_idle();
/// assert_eq!(block_on(awaitable), Ok("🍓"));
/// ```
#[derive(Debug)]
pub struct Awaitable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<Result<T, Error>>,
    waker: Option<Waker>,
}

impl<T: Clone + 'static> Future<T> {
    pub fn into_awaitable(self) -> Awaitable<T> {
        let inner = Rc::new(RefCell::new(Inner {
            value: None,
            waker: None,
        }));
        let target = inner.clone();
        self.on_complete(move |outcome| {
            let waker = {
                let mut inner = target.borrow_mut();
                inner.value = Some(outcome);
                inner.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake()
            }
        });
        Awaitable { inner }
    }
}

impl<T> std::future::Future for Awaitable<T> {
    type Output = Result<T, Error>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let mut inner = self.inner.borrow_mut();
        match inner.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                inner.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
