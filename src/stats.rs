use std::sync::atomic::{AtomicUsize, Ordering};

use crate::state::PoolState;

/// 线程池的即时快照
///
/// `completed` counts every task that ran to its end, including the ones
/// that were interrupted or panicked; those two are tracked separately too.
/// `interrupted` counts tasks, not pauses: a task interrupted several times
/// counts once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub state: PoolState,
    pub capacity: usize,
    pub live_workers: usize,
    pub queued: usize,
    pub active: usize,
    pub submitted: usize,
    pub completed: usize,
    pub interrupted: usize,
    pub panicked: usize,
}

impl PoolStats {
    /// Tasks accepted but not finished yet.
    pub fn pending(&self) -> usize {
        self.submitted.saturating_sub(self.completed)
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.active as f64 / self.capacity as f64
    }
}

/// 线程池句柄与worker共享的计数器
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) live_workers: AtomicUsize,
    pub(crate) active: AtomicUsize,
    pub(crate) submitted: AtomicUsize,
    pub(crate) completed: AtomicUsize,
    pub(crate) interrupted: AtomicUsize,
    pub(crate) panicked: AtomicUsize,
}

impl Counters {
    pub(crate) fn task_started(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn task_finished(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn snapshot(&self, state: PoolState, capacity: usize, queued: usize) -> PoolStats {
        PoolStats {
            state,
            capacity,
            live_workers: self.live_workers.load(Ordering::SeqCst),
            queued,
            active: self.active.load(Ordering::SeqCst),
            submitted: self.submitted.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            interrupted: self.interrupted.load(Ordering::SeqCst),
            panicked: self.panicked.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tracks_tasks() {
        let counters = Counters::default();
        counters.submitted.fetch_add(2, Ordering::SeqCst);
        counters.task_started();
        let stats = counters.snapshot(PoolState::Accepting, 4, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.pending(), 2);
        assert!((stats.utilization() - 0.25).abs() < f64::EPSILON);

        counters.task_finished();
        let stats = counters.snapshot(PoolState::Draining, 4, 0);
        assert_eq!(stats.active, 0);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending(), 1);
    }
}
