//! The deferred-task queue every cell notifies through.
//!
//! Nothing here runs on its own: tasks sit in FIFO order until somebody calls
//! [`Scheduler::run_one`] or [`Scheduler::run_until_idle`], always on the
//! thread that owns the scheduler.
use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};
use tracing::{debug, trace};

type Task = Box<dyn FnOnce()>;

/// A single-threaded FIFO queue of deferred tasks. Clones share the queue.
///
/// # Examples
///
/// ```
/// use deferred_future::Scheduler;
/// use std::{cell::Cell, rc::Rc};
///
/// let scheduler = Scheduler::new();
/// let ran = Rc::new(Cell::new(false));
/// let flag = ran.clone();
/// scheduler.defer(move || flag.set(true));
/// assert!(!ran.get());
/// assert_eq!(scheduler.run_until_idle(), 1);
/// assert!(ran.get());
/// ```
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` behind everything already deferred. Never runs it inline.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        let mut queue = self.queue.borrow_mut();
        queue.push_back(Box::new(task));
        trace!(pending = queue.len(), "task deferred");
    }

    /// Runs the oldest queued task. Returns `false` when there was nothing to
    /// run.
    ///
    /// The task is removed before it runs, so it may defer more work, and a
    /// panic inside it leaves the rest of the queue intact.
    pub fn run_one(&self) -> bool {
        let task = self.queue.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty, including tasks queued along the
    /// way. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        debug!(ran, "scheduler drained");
        ran
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
