//! 线程池生命周期状态机

use std::fmt;

/// Lifecycle of a [`WorkerPool`](crate::WorkerPool).
///
/// `Accepting -> Draining` happens on the first shutdown request,
/// `Draining -> Terminated` once the last worker has exited.
/// Nothing leaves `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    Accepting,
    Draining,
    Terminated,
}

impl PoolState {
    pub fn is_accepting(self) -> bool {
        self == PoolState::Accepting
    }

    pub fn is_terminated(self) -> bool {
        self == PoolState::Terminated
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: PoolState) -> bool {
        matches!(
            (self, next),
            (PoolState::Accepting, PoolState::Draining)
                | (PoolState::Draining, PoolState::Terminated)
        )
    }

    /// Move to `next` if legal. Returns whether the state changed.
    pub(crate) fn advance(&mut self, next: PoolState) -> bool {
        if !self.can_transition_to(next) {
            return false;
        }
        log::debug!("pool state {} -> {}", self, next);
        *self = next;
        true
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolState::Accepting => write!(f, "accepting"),
            PoolState::Draining => write!(f, "draining"),
            PoolState::Terminated => write!(f, "terminated"),
        }
    }
}
