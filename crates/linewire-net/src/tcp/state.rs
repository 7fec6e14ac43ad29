//! State enum for the connection worker.

/// Current state of a [`ConnectionWorker`](super::ConnectionWorker).
///
/// Transitions only move forward: `Idle -> Connecting -> Connected -> Closed`.
/// A failed connect goes straight from `Connecting` to `Closed`. `Closed` is
/// terminal; there is no automatic reconnect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkerState {
    /// Created but not started.
    #[default]
    Idle,
    /// Currently attempting to connect.
    Connecting,
    /// Connected and reading lines.
    Connected,
    /// The connection attempt has ended.
    Closed,
}

impl WorkerState {
    /// Returns `true` once the worker can no longer change state.
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }

    /// Returns `true` while a connection attempt is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Connecting)
                | (Self::Idle, Self::Closed)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::Closed)
                | (Self::Connected, Self::Closed)
        )
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(WorkerState::Idle.to_string(), "Idle");
        assert_eq!(WorkerState::Connecting.to_string(), "Connecting");
        assert_eq!(WorkerState::Connected.to_string(), "Connected");
        assert_eq!(WorkerState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_closed_is_terminal() {
        for next in [
            WorkerState::Idle,
            WorkerState::Connecting,
            WorkerState::Connected,
            WorkerState::Closed,
        ] {
            assert!(!WorkerState::Closed.can_transition_to(next));
        }
        assert!(WorkerState::Closed.is_terminal());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(WorkerState::Idle.can_transition_to(WorkerState::Connecting));
        assert!(WorkerState::Connecting.can_transition_to(WorkerState::Connected));
        assert!(WorkerState::Connecting.can_transition_to(WorkerState::Closed));
        assert!(WorkerState::Connected.can_transition_to(WorkerState::Closed));
        assert!(!WorkerState::Connected.can_transition_to(WorkerState::Connecting));
        assert!(!WorkerState::Idle.can_transition_to(WorkerState::Connected));
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(WorkerState::default(), WorkerState::Idle);
        assert!(!WorkerState::Idle.is_active());
        assert!(WorkerState::Connected.is_active());
    }
}
