//! Delayed-callback facilities used for automatic deactivation
//!
//! The manager never sleeps itself. It hands a [`DeferredTask`] to a
//! [`DeactivationScheduler`], which runs it once the delay has elapsed.
//! [`TokioScheduler`] uses wall-clock timers; [`FrameScheduler`] is driven by
//! the host loop and should be advanced with unscaled frame time so that
//! pausing game logic does not stall pending deactivations.

use crate::errors::{PoolError, PoolResult};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;
use tokio::runtime::Handle;

/// Work to run once a delay has elapsed
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Host facility that runs a task after a delay
pub trait DeactivationScheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed
    fn schedule(&self, delay: Duration, task: DeferredTask);
}

/// Scheduler backed by tokio timers
///
/// # Examples
///
/// ```
/// use prefab_pool::TokioScheduler;
///
/// // Outside a runtime there is nothing to spawn timers on
/// assert!(TokioScheduler::current().is_err());
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let scheduler = TokioScheduler::new(runtime.handle().clone());
/// # drop(scheduler);
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler spawning onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime the caller is running in
    pub fn current() -> PoolResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| PoolError::NoRuntime)
    }
}

impl DeactivationScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

struct Pending {
    deadline: Duration,
    sequence: u64,
    task: DeferredTask,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the BinaryHeap pops the earliest deadline first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct FrameState {
    elapsed: Duration,
    next_sequence: u64,
    queue: BinaryHeap<Pending>,
}

/// Scheduler advanced explicitly from the host's frame loop
///
/// # Examples
///
/// ```
/// use prefab_pool::{DeactivationScheduler, FrameScheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
///
/// let scheduler = FrameScheduler::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&fired);
/// scheduler.schedule(Duration::from_millis(100), Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// scheduler.advance(Duration::from_millis(50));
/// assert!(!fired.load(Ordering::SeqCst));
/// scheduler.advance(Duration::from_millis(50));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
pub struct FrameScheduler {
    state: Mutex<FrameState>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FrameState {
                elapsed: Duration::ZERO,
                next_sequence: 0,
                queue: BinaryHeap::new(),
            }),
        }
    }

    /// Move the clock forward and run every task that has become due
    ///
    /// Returns the number of tasks that ran. Tasks run outside the internal
    /// lock, so they may schedule further work.
    pub fn advance(&self, delta: Duration) -> usize {
        let due = {
            let mut state = self.state.lock();
            state.elapsed += delta;
            let now = state.elapsed;

            let mut due = Vec::new();
            while state.queue.peek().is_some_and(|p| p.deadline <= now) {
                if let Some(pending) = state.queue.pop() {
                    due.push(pending.task);
                }
            }
            due
        };

        let count = due.len();
        for task in due {
            task();
        }
        count
    }

    /// Total time this scheduler has been advanced by
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeactivationScheduler for FrameScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        let mut state = self.state.lock();
        let deadline = state.elapsed + delay;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.queue.push(Pending {
            deadline,
            sequence,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[test]
    fn test_frame_scheduler_runs_in_deadline_order() {
        let scheduler = FrameScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, ms) in [("late", 300u64), ("early", 100), ("tie", 100)] {
            let order = Arc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.lock().push(label)),
            );
        }

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.advance(Duration::from_millis(150)), 2);
        assert_eq!(*order.lock(), vec!["early", "tie"]);

        assert_eq!(scheduler.advance(Duration::from_millis(150)), 1);
        assert_eq!(*order.lock(), vec!["early", "tie", "late"]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn test_frame_scheduler_allows_rescheduling_from_task() {
        let scheduler = Arc::new(FrameScheduler::new());
        let count = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = Arc::clone(&scheduler);
        let inner_count = Arc::clone(&count);
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_count.fetch_add(1, AtomicOrdering::SeqCst);
                let again = Arc::clone(&inner_count);
                inner_scheduler.schedule(
                    Duration::from_millis(10),
                    Box::new(move || {
                        again.fetch_add(1, AtomicOrdering::SeqCst);
                    }),
                );
            }),
        );

        scheduler.advance(Duration::from_millis(10));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
        scheduler.advance(Duration::from_millis(10));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_tokio_scheduler_requires_runtime() {
        assert_eq!(TokioScheduler::current().unwrap_err(), PoolError::NoRuntime);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = Arc::clone(&count);

        scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                task_count.fetch_add(1, AtomicOrdering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }
}
