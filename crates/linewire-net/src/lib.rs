//! Networking module for linewire.
//!
//! This crate provides a single-purpose TCP client: it connects to one
//! endpoint, reads newline-delimited text until the stream ends, and reports
//! what happens to a [`ConnectionSink`](tcp::ConnectionSink):
//!
//! - **Connected**: the socket is open
//! - **Line**: one received line, terminator stripped
//! - **Disconnected**: exactly once, with a human-readable reason
//!
//! All socket I/O happens on a dedicated thread owned by
//! [`ConnectionWorker`](tcp::ConnectionWorker), so the caller's thread never
//! blocks on the network.
//!
//! ```no_run
//! use linewire_net::tcp::{ConnectionWorker, LineClientConfig, SinkEvent, channel};
//!
//! let (sink, events) = channel();
//! let worker = ConnectionWorker::spawn(LineClientConfig::default(), sink)?;
//!
//! while let Ok(event) = events.recv() {
//!     match event {
//!         SinkEvent::Line(line) => println!("{}", line.text),
//!         other if other.is_disconnected() => break,
//!         other => println!("{:?}", other),
//!     }
//! }
//! worker.join();
//! # Ok::<(), linewire_net::NetworkError>(())
//! ```

mod error;
pub mod tcp;

pub use error::{NetworkError, Result};
