//! Lifecycle and data events produced by a connection attempt.

use super::config::Endpoint;

/// Disconnect reason reported when the server closes the stream.
pub const REASON_END_OF_STREAM: &str = "end of stream";
/// Disconnect reason reported after [`ConnectionWorker::stop`](super::ConnectionWorker::stop).
pub const REASON_STOPPED: &str = "stopped by client";

/// Connection lifecycle notification.
///
/// Each variant is emitted at most once per connection attempt, and
/// `Connected` always precedes `Disconnected`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The socket is open and the read loop is about to start.
    Connected {
        /// The endpoint that was connected to.
        endpoint: Endpoint,
    },
    /// The connection attempt has ended.
    Disconnected {
        /// Human-readable description of why.
        reason: String,
    },
}

/// One received line, terminator stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEvent {
    /// The decoded text.
    pub text: String,
}

/// Every notification a sink can receive, as one value.
///
/// Used by sinks that forward events over a channel or into a single closure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// A lifecycle notification.
    Connection(ConnectionEvent),
    /// A received line.
    Line(LineEvent),
}

impl SinkEvent {
    /// Shorthand for a `Connected` event.
    pub fn connected(endpoint: Endpoint) -> Self {
        Self::Connection(ConnectionEvent::Connected { endpoint })
    }

    /// Shorthand for a line event.
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(LineEvent { text: text.into() })
    }

    /// Shorthand for a `Disconnected` event.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Connection(ConnectionEvent::Disconnected {
            reason: reason.into(),
        })
    }

    /// Returns `true` for the final event of a connection attempt.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Connection(ConnectionEvent::Disconnected { .. }))
    }
}
