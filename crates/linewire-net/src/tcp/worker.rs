//! Long-lived TCP line client running on a dedicated thread.

use std::io::{self, BufReader};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use linewire_core::logging::{span_names, targets};
use parking_lot::{Condvar, Mutex};

use super::config::{Endpoint, LineClientConfig};
use super::event::{REASON_END_OF_STREAM, REASON_STOPPED};
use super::reader::LineReader;
use super::sink::ConnectionSink;
use super::state::WorkerState;
use crate::Result;
use crate::error::NetworkError;

/// State shared between the worker handle and its thread.
struct Shared {
    state: Mutex<WorkerState>,
    /// A clone of the connected socket, kept so `stop()` can shut it down.
    socket: Mutex<Option<TcpStream>>,
    stop_requested: AtomicBool,
    finished: Mutex<bool>,
    finished_condvar: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(WorkerState::Idle),
            socket: Mutex::new(None),
            stop_requested: AtomicBool::new(false),
            finished: Mutex::new(false),
            finished_condvar: Condvar::new(),
        }
    }

    fn transition(&self, next: WorkerState) {
        let mut state = self.state.lock();
        let current = *state;
        if current.can_transition_to(next) {
            tracing::debug!(target: targets::WORKER, from = %current, to = %next, "state change");
            *state = next;
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn mark_finished(&self) {
        let mut finished = self.finished.lock();
        *finished = true;
        self.finished_condvar.notify_all();
    }
}

/// A TCP client that reads newline-delimited text on a dedicated thread.
///
/// The worker owns exactly one socket. [`start`](Self::start) returns
/// immediately; the connect and every subsequent read happen on a thread
/// named after [`LineClientConfig::thread_name`]. Progress is reported to the
/// [`ConnectionSink`] passed to `start`:
///
/// - `on_connected` once the socket is open
/// - `on_line` for each received line, in arrival order
/// - `on_disconnected` exactly once, when the attempt ends for any reason
///
/// There is no reconnect. Once the worker is [`Closed`](WorkerState::Closed)
/// it stays closed; create a new worker to try again.
///
/// # Example
///
/// ```no_run
/// use linewire_net::tcp::{ConnectionWorker, LineClientConfig, SinkEvent, channel};
///
/// let (sink, events) = channel();
/// let worker = ConnectionWorker::new(LineClientConfig::default());
/// worker.start(sink)?;
///
/// for event in events {
///     println!("{:?}", event);
///     if event.is_disconnected() {
///         break;
///     }
/// }
/// # Ok::<(), linewire_net::NetworkError>(())
/// ```
pub struct ConnectionWorker {
    config: LineClientConfig,
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionWorker {
    /// Create an idle worker for the configured endpoint.
    pub fn new(config: LineClientConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            handle: Mutex::new(None),
        }
    }

    /// Create a worker and start it with `sink`.
    pub fn spawn<S: ConnectionSink>(config: LineClientConfig, sink: S) -> Result<Self> {
        let worker = Self::new(config);
        worker.start(sink)?;
        Ok(worker)
    }

    /// The configuration this worker was created with.
    pub fn config(&self) -> &LineClientConfig {
        &self.config
    }

    /// The endpoint this worker connects to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// Get the current state.
    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock()
    }

    /// Check if the worker is connected.
    pub fn is_connected(&self) -> bool {
        self.state() == WorkerState::Connected
    }

    /// Check if the connection attempt is over and the sink has been told.
    pub fn is_finished(&self) -> bool {
        *self.shared.finished.lock()
    }

    /// Start connecting on a dedicated thread.
    ///
    /// Only valid while [`Idle`](WorkerState::Idle); any other state returns
    /// [`NetworkError::NotIdle`] and the sink is dropped without being called.
    /// If the thread cannot be spawned, including when the configured thread
    /// name contains a NUL byte, the worker becomes `Closed` and
    /// [`NetworkError::Spawn`] is returned.
    pub fn start<S: ConnectionSink>(&self, sink: S) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            if *state != WorkerState::Idle {
                return Err(NetworkError::NotIdle(*state));
            }
            *state = WorkerState::Connecting;
        }

        let shared = self.shared.clone();
        let endpoint = self.config.endpoint.clone();
        let connect_timeout = self.config.connect_timeout;

        // Builder::spawn panics on a name with an interior NUL
        let spawned = if self.config.thread_name.contains('\0') {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "thread name must not contain NUL bytes",
            ))
        } else {
            thread::Builder::new()
                .name(self.config.thread_name.clone())
                .spawn(move || run_connection(endpoint, connect_timeout, &shared, sink))
        };

        match spawned {
            Ok(handle) => {
                *self.handle.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                tracing::error!(target: targets::WORKER, error = %e, "failed to spawn connection thread");
                self.shared.transition(WorkerState::Closed);
                self.shared.mark_finished();
                Err(NetworkError::Spawn(e.to_string()))
            }
        }
    }

    /// Stop the connection.
    ///
    /// Shuts down the socket if it is open. The blocked read returns and the
    /// worker reports `on_disconnected("stopped by client")`. While still
    /// connecting, the socket is closed as soon as the connect returns and
    /// `on_connected` is skipped. On an idle worker this moves straight to
    /// `Closed` without notifying anyone.
    ///
    /// Idempotent: calling it again, or after the worker has closed on its
    /// own, produces no further notifications. Non-blocking; use
    /// [`join`](Self::join) to wait for the thread.
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);

        {
            let mut state = self.shared.state.lock();
            if *state == WorkerState::Idle {
                *state = WorkerState::Closed;
                drop(state);
                self.shared.mark_finished();
                return;
            }
        }

        if let Some(socket) = self.shared.socket.lock().as_ref() {
            tracing::debug!(target: targets::WORKER, endpoint = %self.config.endpoint, "shutting down socket");
            // The peer may already be gone; the read loop reports that itself.
            let _ = socket.shutdown(Shutdown::Both);
        }
    }

    /// Wait for the worker thread to finish.
    ///
    /// Returns `true` if the thread was joined successfully, `false` if it
    /// was never started, was already joined, or panicked. Must not be called
    /// from inside a sink callback.
    pub fn join(&self) -> bool {
        let handle = self.handle.lock().take();
        match handle {
            Some(h) => h.join().is_ok(),
            None => false,
        }
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// This is equivalent to calling `stop()` followed by `join()`.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }

    /// Wait until the attempt is over and `on_disconnected` has returned.
    ///
    /// Returns `true` if that happened within `timeout`.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut finished = self.shared.finished.lock();
        while !*finished {
            if self
                .shared
                .finished_condvar
                .wait_until(&mut finished, deadline)
                .timed_out()
            {
                return *finished;
            }
        }
        true
    }
}

impl Drop for ConnectionWorker {
    fn drop(&mut self) {
        self.stop();
        // Don't block in drop - the thread exits once the socket is shut down
    }
}

impl std::fmt::Debug for ConnectionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionWorker")
            .field("address", &self.config.address())
            .field("state", &self.state())
            .finish()
    }
}

/// Body of the connection thread: connect, read, report the outcome once.
fn run_connection<S: ConnectionSink>(
    endpoint: Endpoint,
    connect_timeout: Option<Duration>,
    shared: &Shared,
    mut sink: S,
) {
    let span = tracing::info_span!(target: targets::WORKER, span_names::CONNECTION, endpoint = %endpoint);
    let _entered = span.enter();

    tracing::debug!(target: targets::WORKER, timeout = ?connect_timeout, "connecting");

    let reason = match open_stream(&endpoint, connect_timeout) {
        Ok(stream) => serve(&endpoint, stream, shared, &mut sink),
        Err(err) => {
            tracing::warn!(target: targets::WORKER, error = %err, "connect failed");
            err.to_string()
        }
    };

    shared.socket.lock().take();
    shared.transition(WorkerState::Closed);
    tracing::info!(target: targets::WORKER, reason = %reason, "disconnected");
    sink.on_disconnected(reason);
    shared.mark_finished();
}

/// Publish the socket for `stop()`, announce the connection, and run the read loop.
///
/// Returns the disconnect reason.
fn serve<S: ConnectionSink>(
    endpoint: &Endpoint,
    stream: TcpStream,
    shared: &Shared,
    sink: &mut S,
) -> String {
    match stream.try_clone() {
        Ok(handle) => *shared.socket.lock() = Some(handle),
        Err(err) => {
            tracing::warn!(target: targets::WORKER, error = %err, "failed to clone socket handle");
            return NetworkError::from(err).to_string();
        }
    }

    // stop() sets the flag before looking at the socket, so one of the two
    // sides always sees the other.
    if shared.stop_requested() {
        let _ = stream.shutdown(Shutdown::Both);
        return REASON_STOPPED.to_string();
    }

    shared.transition(WorkerState::Connected);
    tracing::info!(target: targets::WORKER, "connected");
    sink.on_connected(endpoint);

    read_lines(stream, shared, sink)
}

/// Deliver lines until end of stream, an I/O error, or a stop request.
fn read_lines<S: ConnectionSink>(stream: TcpStream, shared: &Shared, sink: &mut S) -> String {
    let mut reader = LineReader::new(BufReader::new(stream));
    let mut received: u64 = 0;

    loop {
        let result = reader.next_line();
        if shared.stop_requested() {
            tracing::debug!(target: targets::WORKER, lines = received, "stop requested");
            return REASON_STOPPED.to_string();
        }

        match result {
            Ok(Some(line)) => {
                received += 1;
                tracing::trace!(target: targets::WORKER, line_number = received, len = line.len(), "line received");
                sink.on_line(line);
            }
            Ok(None) => {
                tracing::debug!(target: targets::WORKER, lines = received, "end of stream");
                return REASON_END_OF_STREAM.to_string();
            }
            Err(err) => {
                tracing::warn!(target: targets::WORKER, error = %err, lines = received, "read failed");
                return NetworkError::from(err).to_string();
            }
        }
    }
}

/// Open a blocking TCP connection, honoring the optional connect timeout.
fn open_stream(endpoint: &Endpoint, timeout: Option<Duration>) -> Result<TcpStream> {
    let target = (endpoint.host(), endpoint.port());

    let Some(timeout) = timeout else {
        return TcpStream::connect(target).map_err(|e| NetworkError::connect(endpoint, e));
    };

    let addrs = target
        .to_socket_addrs()
        .map_err(|e| NetworkError::connect(endpoint, e))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(match last_err {
        Some(e) => NetworkError::connect(endpoint, e),
        None => NetworkError::connect(endpoint, "host resolved to no addresses"),
    })
}
