//! Core systems for linewire.
//!
//! This crate provides the pieces a presentation layer needs to receive
//! notifications from background work without sharing its own state:
//!
//! - **Signal/Slot System**: Type-safe observer notifications
//! - **Event Queue**: Ordered, single-consumer delivery onto the presentation thread
//! - **Logging**: Target and span names for `tracing` filters
//!
//! # Signal/Slot Example
//!
//! ```
//! use linewire_core::Signal;
//!
//! let connected = Signal::<String>::new();
//!
//! let conn_id = connected.connect(|address| {
//!     println!("Connected to {}", address);
//! });
//!
//! connected.emit("127.0.0.1:8081".to_string());
//! connected.disconnect(conn_id);
//! ```
//!
//! # Cross-Thread Example
//!
//! ```
//! use std::sync::Arc;
//! use linewire_core::{EventQueue, Signal};
//!
//! let queue = EventQueue::new();
//! let line_received = Arc::new(Signal::<String>::new());
//!
//! line_received.connect_queued(&queue.handle(), |line| println!("{}", line));
//!
//! let producer = line_received.clone();
//! std::thread::spawn(move || producer.emit("hello".to_string()))
//!     .join()
//!     .unwrap();
//!
//! // The slot runs here, on the thread that owns the queue.
//! queue.process_pending();
//! ```

mod error;
pub mod event_queue;
pub mod logging;
pub mod signal;

pub use error::{CoreError, Result};
pub use event_queue::{EventQueue, EventQueueHandle, QueuedInvocation};
pub use signal::{ConnectionId, ConnectionType, Signal};
