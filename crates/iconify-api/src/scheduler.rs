//! Deferred execution.
//!
//! The loader never resolves anything synchronously. Every deferred step
//! goes through a [`Scheduler`], so hosts can plug in their own event loop
//! and tests can drive time by hand with [`ManualScheduler`].

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Runs tasks after a delay.
///
/// A zero delay means "next tick": the task must not run before
/// `schedule` returns.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task);
}

/// An entry in the queue (min-heap by run time, then insertion order).
struct QueueEntry {
    run_at: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_at == other.run_at && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<QueueEntry>,
}

/// Scheduler with virtual time.
///
/// Nothing runs until the owner calls [`advance`](Self::advance) or
/// [`run_until_idle`](Self::run_until_idle). Tasks due at the same instant
/// run in the order they were scheduled. Clones share one queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Run every task due within `delta`, then move the clock forward.
    ///
    /// Tasks scheduled while advancing run too if they fall inside the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.now() + delta;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Run tasks until the queue is empty, jumping the clock as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(Duration::MAX) {
            task();
            ran += 1;
        }
        ran
    }

    /// Run only the tasks due right now.
    pub fn tick(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    fn pop_due(&self, limit: Duration) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        if state.queue.peek()?.run_at > limit {
            return None;
        }
        let entry = state.queue.pop()?;
        if entry.run_at > state.now {
            state.now = entry.run_at;
        }
        Some(entry.task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.state.borrow_mut();
        let run_at = state.now.saturating_add(delay);
        let seq = state.seq;
        state.seq += 1;
        state.queue.push(QueueEntry { run_at, seq, task });
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}
