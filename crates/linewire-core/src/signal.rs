//! Signal/slot system for linewire.
//!
//! This module provides a type-safe signal/slot mechanism for notifying a
//! presentation layer about events produced elsewhere. Signals are emitted by
//! a producer (typically a background worker), and connected slots
//! (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionType`] - How a slot should be invoked (Direct or Queued)
//!
//! # Connection Types
//!
//! - **Direct**: Slot is called immediately in the emitting thread
//! - **Queued**: Slot execution is posted to an [`EventQueue`] and runs on the
//!   thread that drains that queue
//!
//! # Thread Safety
//!
//! Signals are `Send + Sync`. A worker thread emitting a signal never runs a
//! queued slot itself; it only clones the arguments and posts them. This is
//! how presentation state stays confined to the presentation thread.
//!
//! # Example
//!
//! ```
//! use linewire_core::{EventQueue, Signal};
//!
//! let queue = EventQueue::new();
//! let line_received = Signal::<String>::new();
//!
//! line_received.connect_queued(&queue.handle(), |line| {
//!     println!("line: {}", line);
//! });
//!
//! line_received.emit("hello".to_string());
//! assert_eq!(queue.process_pending(), 1);
//! ```
//!
//! [`EventQueue`]: crate::EventQueue

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::event_queue::EventQueueHandle;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

/// Specifies how a connected slot should be invoked when the signal is emitted.
#[derive(Clone, Debug)]
pub enum ConnectionType {
    /// Invoke the slot immediately in the emitting thread.
    ///
    /// This is the fastest option but requires the slot to be safe to call
    /// from any thread.
    Direct,

    /// Post the slot invocation to an event queue.
    ///
    /// The slot runs when the queue's owner processes pending events. If the
    /// queue has been dropped, the invocation is discarded.
    Queued(EventQueueHandle),
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke (Arc-wrapped for safe cross-thread capture).
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
    /// How to invoke this slot.
    connection_type: ConnectionType,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with the provided
/// arguments, in connection order.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) that is invoked directly in the emitting thread.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use linewire_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// assert!(signal.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_type(slot, ConnectionType::Direct)
    }

    /// Connect a slot that runs on the thread draining `queue`.
    pub fn connect_queued<F>(&self, queue: &EventQueueHandle, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_type(slot, ConnectionType::Queued(queue.clone()))
    }

    /// Connect a slot with a specific connection type.
    pub fn connect_with_type<F>(&self, slot: F, connection_type: ConnectionType) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
            connection_type,
        };
        self.connections.lock().insert(connection)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// If the signal is blocked, this does nothing. Otherwise, all connected
    /// slots are invoked according to their connection type:
    ///
    /// - `Direct`: Called immediately in the current thread
    /// - `Queued`: Posted to the connection's event queue
    ///
    /// Slots run after the internal connection lock is released, so a slot
    /// may connect or disconnect on the same signal.
    #[tracing::instrument(skip_all, target = "linewire_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<_> = {
            let connections = self.connections.lock();
            tracing::trace!(target: targets::SIGNAL, connection_count = connections.len(), "emitting signal");
            connections
                .values()
                .map(|conn| (conn.slot.clone(), conn.connection_type.clone()))
                .collect()
        };

        for (slot, connection_type) in snapshot {
            match connection_type {
                ConnectionType::Direct => slot(&args),
                ConnectionType::Queued(queue) => {
                    let args = args.clone();
                    if queue.post(move || slot(&args)).is_err() {
                        tracing::warn!(
                            target: targets::SIGNAL,
                            "event queue closed, dropping queued slot invocation"
                        );
                    }
                }
            }
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}
