//! Queued invocations for delivering notifications on the presentation thread.
//!
//! Background threads never touch presentation state directly. Instead they
//! post [`QueuedInvocation`]s through an [`EventQueueHandle`], and the thread
//! that owns the [`EventQueue`] drains them with [`EventQueue::process_pending`]
//! or [`EventQueue::run_until`].
//!
//! # How It Works
//!
//! 1. When a signal with a queued connection is emitted, the slot call is
//!    wrapped in a closure together with a clone of the arguments.
//!
//! 2. The closure is posted to the queue the connection was made against.
//!
//! 3. The owning thread executes invocations in the order they were posted.
//!
//! # Example
//!
//! ```
//! use linewire_core::EventQueue;
//!
//! let queue = EventQueue::new();
//! let handle = queue.handle();
//!
//! std::thread::spawn(move || {
//!     handle.post(|| println!("runs on the queue owner's thread")).ok();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(queue.process_pending(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::{CoreError, Result};
use crate::logging::targets;

/// How long [`EventQueue::run_until`] blocks between checks of its condition.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A type-erased queued invocation that can be executed later.
///
/// This wraps a closure that captures the slot and its arguments,
/// allowing deferred execution on the target thread.
pub struct QueuedInvocation {
    id: u64,
    invoke: Box<dyn FnOnce() + Send>,
}

impl QueuedInvocation {
    /// Create a new queued invocation.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        static NEXT_INVOCATION_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed),
            invoke: Box::new(invoke),
        }
    }

    /// Unique, monotonically increasing identifier of this invocation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Execute the invocation.
    pub fn execute(self) {
        (self.invoke)();
    }
}

impl std::fmt::Debug for QueuedInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedInvocation").field("id", &self.id).finish()
    }
}

/// Sending side of an [`EventQueue`].
///
/// Handles are cheap to clone and can be moved to any thread.
#[derive(Clone, Debug)]
pub struct EventQueueHandle {
    sender: Sender<QueuedInvocation>,
}

impl EventQueueHandle {
    /// Post a closure for execution on the queue owner's thread.
    pub fn post<F>(&self, invoke: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_invocation(QueuedInvocation::new(invoke))
    }

    /// Post an already constructed invocation.
    pub fn post_invocation(&self, invocation: QueuedInvocation) -> Result<()> {
        let id = invocation.id();
        self.sender.send(invocation).map_err(|_| {
            tracing::warn!(target: targets::QUEUE, invocation_id = id, "event queue dropped, invocation discarded");
            CoreError::QueueClosed
        })
    }
}

/// A FIFO of invocations owned by the presentation thread.
///
/// `EventQueue` is not `Clone`: exactly one thread drains it.
/// Producers use [`EventQueue::handle`].
pub struct EventQueue {
    sender: Sender<QueuedInvocation>,
    receiver: Receiver<QueuedInvocation>,
    processed: AtomicU64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            processed: AtomicU64::new(0),
        }
    }

    /// Get a handle that producers use to post invocations.
    pub fn handle(&self) -> EventQueueHandle {
        EventQueueHandle {
            sender: self.sender.clone(),
        }
    }

    /// Number of invocations waiting to be executed.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Total number of invocations executed by this queue.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Execute every invocation that is currently queued.
    ///
    /// Returns the number of invocations executed.
    pub fn process_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(invocation) = self.receiver.try_recv() {
            self.execute(invocation);
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for one invocation and execute it.
    ///
    /// Returns `true` if an invocation ran.
    pub fn process_next_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(invocation) => {
                self.execute(invocation);
                true
            }
            // The queue holds its own sender, so it can never disconnect.
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Process invocations until `done` returns `true`.
    ///
    /// `done` is checked before blocking and after every invocation. With
    /// `timeout` set, returns [`CoreError::Timeout`] once it elapses; without
    /// it, blocks for as long as it takes.
    ///
    /// Returns the number of invocations executed.
    pub fn run_until<F>(&self, done: F, timeout: Option<Duration>) -> Result<usize>
    where
        F: Fn() -> bool,
    {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut count = 0;

        loop {
            count += self.process_pending();
            if done() {
                return Ok(count);
            }

            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(CoreError::Timeout(timeout.unwrap_or_default()));
                    }
                    (deadline - now).min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };

            if self.process_next_timeout(wait) {
                count += 1;
            }
        }
    }

    fn execute(&self, invocation: QueuedInvocation) {
        tracing::trace!(target: targets::QUEUE, invocation_id = invocation.id(), "executing queued invocation");
        invocation.execute();
        self.processed.fetch_add(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending())
            .field("processed", &self.processed())
            .finish()
    }
}
