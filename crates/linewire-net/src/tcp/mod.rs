//! Long-lived TCP line client with lifecycle notifications.
//!
//! This module provides:
//! - **ConnectionWorker**: Connects on a dedicated thread and reads newline-delimited text
//! - **ConnectionSink**: The observer the worker reports to
//! - **LineClientConfig**: Endpoint, connect timeout and thread name, from code or TOML
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use linewire_core::EventQueue;
//! use linewire_net::tcp::{ConnectionSignals, ConnectionWorker, LineClientConfig, SignalSink};
//!
//! let queue = EventQueue::new();
//! let signals = Arc::new(ConnectionSignals::new());
//!
//! signals.connected.connect_queued(&queue.handle(), |endpoint| {
//!     println!("Connected to server at {}", endpoint);
//! });
//! signals.line_received.connect_queued(&queue.handle(), |line| {
//!     println!("{}", line);
//! });
//!
//! let worker = ConnectionWorker::new(LineClientConfig::default());
//! worker.start(SignalSink::new(signals.clone()))?;
//!
//! // Slots run here, on the thread that owns the queue.
//! queue.run_until(|| worker.is_finished(), None).ok();
//! queue.process_pending();
//! # Ok::<(), linewire_net::NetworkError>(())
//! ```

mod config;
mod event;
mod reader;
mod sink;
mod state;
mod worker;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_THREAD_NAME, Endpoint, LineClientConfig};
pub use event::{ConnectionEvent, LineEvent, REASON_END_OF_STREAM, REASON_STOPPED, SinkEvent};
pub use reader::LineReader;
pub use sink::{ChannelSink, ConnectionSignals, ConnectionSink, FnSink, SignalSink, channel, sink_fn};
pub use state::WorkerState;
pub use worker::ConnectionWorker;
