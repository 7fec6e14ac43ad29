//! Error types for linewire core.

use std::time::Duration;

/// The main error type for core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The event queue has been dropped and no longer accepts invocations.
    #[error("Event queue is closed")]
    QueueClosed,

    /// Waiting on the event queue exceeded the allowed time.
    #[error("Timed out after {0:?} waiting for queued events")]
    Timeout(Duration),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_closed_display() {
        assert_eq!(CoreError::QueueClosed.to_string(), "Event queue is closed");
    }

    #[test]
    fn test_timeout_display() {
        let err = CoreError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Timed out after 250ms waiting for queued events");
    }
}
