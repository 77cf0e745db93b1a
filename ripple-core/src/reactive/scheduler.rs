//! Microtask Scheduler
//!
//! Batched notifications are delivered from a per-thread FIFO of deferred
//! jobs. The host loop drains it with [`run_microtasks`] once its current
//! synchronous unit of work has finished, which plays the role of the
//! microtask checkpoint of an event loop.
//!
//! Jobs queued while draining run in the same drain, after the jobs that
//! were already waiting.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::Result;

type Microtask = Box<dyn FnOnce() -> Result<()>>;

thread_local! {
    static MICROTASKS: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
}

/// Queue a job to run on the next [`run_microtasks`] call of this thread.
pub fn queue_microtask<F>(task: F)
where
    F: FnOnce() -> Result<()> + 'static,
{
    MICROTASKS.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Run queued jobs until the queue is empty.
///
/// Returns the number of jobs that ran. The first job error stops the drain
/// and is returned as-is; jobs still queued stay queued.
pub fn run_microtasks() -> Result<usize> {
    let mut ran = 0;

    loop {
        // The borrow ends before the job runs so jobs can queue more jobs.
        let next = MICROTASKS.with(|queue| queue.borrow_mut().pop_front());
        let Some(task) = next else { break };

        task()?;
        ran += 1;
    }

    if ran > 0 {
        tracing::trace!(ran, "microtasks drained");
    }
    Ok(ran)
}

/// Number of jobs waiting on the current thread.
pub fn pending_microtasks() -> usize {
    MICROTASKS.with(|queue| queue.borrow().len())
}
