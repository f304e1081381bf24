//! Cooperative delayed-task scheduling.
//!
//! Single-threaded and tick-driven: the owning world calls
//! [`Scheduler::due`] from its logic tick with the current virtual time
//! and handles whatever came due. No threads, no real sleeps, and
//! cancellation is the caller's liveness check at fire time.

use std::time::Duration;

use crate::instance::InstanceId;

/// A deferred runtime action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Release the remaining kinematic pieces of an instance.
    CascadeRelease { instance: InstanceId },
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    at: Duration,
    task: Task,
}

/// A queue of tasks deferred to future tick times.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer a task until virtual time `at`.
    pub fn schedule(&mut self, at: Duration, task: Task) {
        self.tasks.push(ScheduledTask { at, task });
    }

    /// Remove and return every task due at or before `now`, in schedule
    /// order.
    pub fn due(&mut self, now: Duration) -> Vec<Task> {
        let mut fired = Vec::new();
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].at <= now {
                fired.push(self.tasks.swap_remove(i));
            } else {
                i += 1;
            }
        }

        fired.sort_by_key(|t| t.at);
        fired.into_iter().map(|t| t.task).collect()
    }

    /// Number of tasks still pending.
    #[inline]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(raw: u64) -> Task {
        Task::CascadeRelease {
            instance: InstanceId::from_raw(raw),
        }
    }

    #[test]
    fn test_tasks_fire_at_or_after_deadline() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(500), release(1));

        assert!(scheduler.due(Duration::from_millis(499)).is_empty());
        assert_eq!(scheduler.pending(), 1);

        let fired = scheduler.due(Duration::from_millis(500));
        assert_eq!(fired, vec![release(1)]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_due_returns_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(900), release(3));
        scheduler.schedule(Duration::from_millis(100), release(1));
        scheduler.schedule(Duration::from_millis(500), release(2));

        let fired = scheduler.due(Duration::from_secs(1));
        assert_eq!(fired, vec![release(1), release(2), release(3)]);
    }

    #[test]
    fn test_undue_tasks_stay_queued() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_secs(1), release(1));
        scheduler.schedule(Duration::from_secs(3), release(2));

        assert_eq!(scheduler.due(Duration::from_secs(2)), vec![release(1)]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.due(Duration::from_secs(3)), vec![release(2)]);
    }
}
