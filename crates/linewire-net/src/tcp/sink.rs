//! Observer interface through which a connection reports to its caller.
//!
//! The worker thread owns its sink and calls it serially, so implementations
//! never see overlapping calls and may keep plain mutable state. Anything the
//! sink hands to a presentation layer must be marshaled onto that layer's
//! thread by the sink itself; [`SignalSink`] with queued slot connections and
//! [`ChannelSink`] are the two ready-made ways of doing that.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use linewire_core::Signal;
use linewire_core::logging::targets;

use super::config::Endpoint;
use super::event::SinkEvent;

/// Receives lifecycle and data notifications from a [`ConnectionWorker`].
///
/// For one connection attempt the worker calls, in order: `on_connected` at
/// most once, `on_line` zero or more times (only after `on_connected`), and
/// `on_disconnected` exactly once. Calls are fire-and-forget.
///
/// [`ConnectionWorker`]: super::ConnectionWorker
pub trait ConnectionSink: Send + 'static {
    /// The socket is open.
    fn on_connected(&mut self, endpoint: &Endpoint);

    /// A line arrived, terminator stripped.
    fn on_line(&mut self, line: String);

    /// The connection attempt ended.
    fn on_disconnected(&mut self, reason: String);
}

impl<S: ConnectionSink + ?Sized> ConnectionSink for Box<S> {
    fn on_connected(&mut self, endpoint: &Endpoint) {
        (**self).on_connected(endpoint);
    }

    fn on_line(&mut self, line: String) {
        (**self).on_line(line);
    }

    fn on_disconnected(&mut self, reason: String) {
        (**self).on_disconnected(reason);
    }
}

/// A sink that forwards every notification into a channel.
///
/// Created with [`channel`]. If the receiver is dropped, further events are
/// discarded.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<SinkEvent>,
    receiver_gone: bool,
}

/// Create a [`ChannelSink`] and the receiver for its events.
///
/// # Example
///
/// ```
/// use linewire_net::tcp::{ConnectionSink, SinkEvent, channel};
///
/// let (mut sink, events) = channel();
/// sink.on_line("hello".to_string());
/// assert_eq!(events.try_recv().unwrap(), SinkEvent::line("hello"));
/// ```
pub fn channel() -> (ChannelSink, Receiver<SinkEvent>) {
    let (sender, receiver) = unbounded();
    (
        ChannelSink {
            sender,
            receiver_gone: false,
        },
        receiver,
    )
}

impl ChannelSink {
    fn forward(&mut self, event: SinkEvent) {
        if self.receiver_gone {
            return;
        }
        if self.sender.send(event).is_err() {
            tracing::debug!(target: targets::SINK, "event receiver dropped, discarding further events");
            self.receiver_gone = true;
        }
    }
}

impl ConnectionSink for ChannelSink {
    fn on_connected(&mut self, endpoint: &Endpoint) {
        self.forward(SinkEvent::connected(endpoint.clone()));
    }

    fn on_line(&mut self, line: String) {
        self.forward(SinkEvent::line(line));
    }

    fn on_disconnected(&mut self, reason: String) {
        self.forward(SinkEvent::disconnected(reason));
    }
}

/// Signals emitted for a connection's lifecycle.
///
/// # Signals
///
/// - [`connected`](Self::connected): Emitted when the connection is established
/// - [`line_received`](Self::line_received): Emitted for every received line
/// - [`disconnected`](Self::disconnected): Emitted once when the attempt ends
///
/// Connect slots with [`Signal::connect_queued`] to have them run on the
/// presentation thread.
#[derive(Debug, Default)]
pub struct ConnectionSignals {
    /// Signal emitted when the connection is established.
    pub connected: Signal<Endpoint>,
    /// Signal emitted when a line is received.
    pub line_received: Signal<String>,
    /// Signal emitted when the connection attempt ends, with the reason.
    pub disconnected: Signal<String>,
}

impl ConnectionSignals {
    /// Create a set of signals with no connections.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A sink that emits [`ConnectionSignals`].
#[derive(Debug, Clone)]
pub struct SignalSink {
    signals: Arc<ConnectionSignals>,
}

impl SignalSink {
    /// Create a sink emitting on `signals`.
    pub fn new(signals: Arc<ConnectionSignals>) -> Self {
        Self { signals }
    }

    /// The signals this sink emits on.
    pub fn signals(&self) -> &Arc<ConnectionSignals> {
        &self.signals
    }
}

impl ConnectionSink for SignalSink {
    fn on_connected(&mut self, endpoint: &Endpoint) {
        self.signals.connected.emit(endpoint.clone());
    }

    fn on_line(&mut self, line: String) {
        self.signals.line_received.emit(line);
    }

    fn on_disconnected(&mut self, reason: String) {
        self.signals.disconnected.emit(reason);
    }
}

/// A sink backed by a single closure over [`SinkEvent`].
pub struct FnSink<F> {
    f: F,
}

/// Build a sink from a closure.
///
/// ```
/// use linewire_net::tcp::{ConnectionSink, SinkEvent, sink_fn};
///
/// let mut count = 0;
/// let mut sink = sink_fn(move |event: SinkEvent| {
///     if let SinkEvent::Line(_) = event {
///         count += 1;
///     }
/// });
/// sink.on_line("x".to_string());
/// ```
pub fn sink_fn<F>(f: F) -> FnSink<F>
where
    F: FnMut(SinkEvent) + Send + 'static,
{
    FnSink { f }
}

impl<F> ConnectionSink for FnSink<F>
where
    F: FnMut(SinkEvent) + Send + 'static,
{
    fn on_connected(&mut self, endpoint: &Endpoint) {
        (self.f)(SinkEvent::connected(endpoint.clone()));
    }

    fn on_line(&mut self, line: String) {
        (self.f)(SinkEvent::line(line));
    }

    fn on_disconnected(&mut self, reason: String) {
        (self.f)(SinkEvent::disconnected(reason));
    }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}
