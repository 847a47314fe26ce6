//! Deferred futures for a single thread.
//!
//! A [`Future`] settles at most once, to a value or an [`Error`]. Observers and
//! combinators never run inline: every notification goes through an explicit
//! [`Scheduler`] queue and runs when that queue is drained.
//!
//! ```
//! use deferred_future::{Error, Future, Scheduler};
//!
//! let scheduler = Scheduler::new();
//! let s = scheduler.clone();
//! let answer = Future::create(&scheduler, || Ok(20))
//!     .map(|n| n * 2)
//!     .filter(|n| *n > 0)
//!     .flat_map(move |n| Future::successful(&s, n + 2))
//!     .recover(|_: Error| 0);
//! answer.on_success(|n| println!("answer: {n}"));
//! scheduler.run_until_idle();
//! assert_eq!(answer.value(), Some(Ok(42)));
//! ```
use thiserror::Error;

pub mod awaitable;
pub mod cell;
pub mod future;
pub mod promise;
pub mod scheduler;
mod sequence;

pub use awaitable::Awaitable;
pub use cell::CompletionCell;
pub use future::Future;
pub use promise::Promise;
pub use scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A user computation reported a failure.
    #[error("{0}")]
    Failed(String),
    /// A user computation panicked.
    #[error("computation panicked: {0}")]
    Panicked(String),
    /// A filter predicate rejected the value.
    #[error("no such element")]
    NoSuchElement,
    #[error("completion cell already settled")]
    AlreadySettled,
    #[error("producer dropped before settling")]
    ProducerDropped,
}

impl Error {
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Failed(message.into())
    }
}
