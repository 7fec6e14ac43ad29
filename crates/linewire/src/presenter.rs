//! Terminal presentation of a connection.
//!
//! Received lines go to one writer (stdout), notifications to another
//! (stderr). Every method runs on the thread that drains the [`EventQueue`].

use std::io::{self, Write};
use std::sync::Arc;

use linewire_core::{CoreError, EventQueue};
use linewire_net::tcp::{ConnectionSignals, ConnectionWorker, Endpoint, LineClientConfig, SignalSink};
use parking_lot::Mutex;

use crate::error::AppError;

/// How a connection attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the socket was ever open.
    pub connected: bool,
    /// Number of lines printed.
    pub lines: u64,
    /// The disconnect reason.
    pub reason: String,
}

impl Outcome {
    /// Process exit status: success only if the server was reached.
    pub fn exit_code(&self) -> u8 {
        if self.connected { 0 } else { 1 }
    }
}

/// Writes connection output for a human.
#[derive(Debug)]
pub struct Presenter<O, N> {
    out: O,
    notices: N,
    connected: bool,
    lines: u64,
    reason: Option<String>,
}

impl<O: Write, N: Write> Presenter<O, N> {
    /// Create a presenter writing lines to `out` and notifications to `notices`.
    pub fn new(out: O, notices: N) -> Self {
        Self {
            out,
            notices,
            connected: false,
            lines: 0,
            reason: None,
        }
    }

    pub fn show_connected(&mut self, endpoint: &Endpoint) -> io::Result<()> {
        self.connected = true;
        writeln!(self.notices, "Connected to server at {endpoint}")?;
        self.notices.flush()
    }

    pub fn show_line(&mut self, line: &str) -> io::Result<()> {
        self.lines += 1;
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn show_disconnected(&mut self, reason: &str) -> io::Result<()> {
        self.reason = Some(reason.to_string());
        if self.connected {
            writeln!(self.notices, "Disconnected from server: {reason}")?;
        } else {
            writeln!(self.notices, "Error connecting to server: {reason}")?;
        }
        self.notices.flush()
    }

    /// Whether the disconnect notification has been shown.
    pub fn is_finished(&self) -> bool {
        self.reason.is_some()
    }

    /// Summary of the attempt, once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        self.reason.as_ref().map(|reason| Outcome {
            connected: self.connected,
            lines: self.lines,
            reason: reason.clone(),
        })
    }
}

fn report(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to write output");
    }
}

/// Connect with `config` and present everything until the connection ends.
///
/// The worker reports through queued signal connections, so the presenter
/// only ever runs on the calling thread.
pub fn run<O, N>(config: LineClientConfig, presenter: Presenter<O, N>) -> Result<Outcome, AppError>
where
    O: Write + Send + 'static,
    N: Write + Send + 'static,
{
    let queue = EventQueue::new();
    let signals = Arc::new(ConnectionSignals::new());
    let presenter = Arc::new(Mutex::new(presenter));

    let p = presenter.clone();
    signals
        .connected
        .connect_queued(&queue.handle(), move |endpoint| report(p.lock().show_connected(endpoint)));
    let p = presenter.clone();
    signals
        .line_received
        .connect_queued(&queue.handle(), move |line| report(p.lock().show_line(line)));
    let p = presenter.clone();
    signals
        .disconnected
        .connect_queued(&queue.handle(), move |reason| report(p.lock().show_disconnected(reason)));

    tracing::info!(address = %config.address(), "starting connection");
    let worker = ConnectionWorker::spawn(config, SignalSink::new(signals.clone()))?;

    let processed = queue.run_until(|| presenter.lock().is_finished(), None)?;
    tracing::debug!(processed, "presentation queue drained");
    worker.join();

    let outcome = presenter.lock().outcome();
    outcome.ok_or(AppError::Queue(CoreError::QueueClosed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// A writer whose contents stay readable after it is moved away.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn local_config(port: u16) -> LineClientConfig {
        LineClientConfig::new(Endpoint::new("127.0.0.1", port).unwrap())
    }

    #[test]
    fn test_presenter_connected_session() {
        let mut presenter = Presenter::new(Vec::new(), Vec::new());
        presenter.show_connected(&Endpoint::default()).unwrap();
        presenter.show_line("welcome :)").unwrap();
        assert!(!presenter.is_finished());
        presenter.show_disconnected("end of stream").unwrap();

        assert_eq!(String::from_utf8_lossy(&presenter.out), "welcome :)\n");
        assert_eq!(
            String::from_utf8_lossy(&presenter.notices),
            "Connected to server at 127.0.0.1:8081\nDisconnected from server: end of stream\n"
        );
        let outcome = presenter.outcome().unwrap();
        assert!(outcome.connected);
        assert_eq!(outcome.lines, 1);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_presenter_connect_failure() {
        let mut presenter = Presenter::new(Vec::new(), Vec::new());
        assert!(presenter.outcome().is_none());
        presenter.show_disconnected("Connection refused").unwrap();

        assert!(presenter.out.is_empty());
        assert_eq!(
            String::from_utf8_lossy(&presenter.notices),
            "Error connecting to server: Connection refused\n"
        );
        assert_eq!(presenter.outcome().unwrap().exit_code(), 1);
    }

    #[test]
    fn test_run_prints_server_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"welcome :)\nsecond\n").unwrap();
        });

        let out = SharedBuf::default();
        let notices = SharedBuf::default();
        let outcome = run(local_config(port), Presenter::new(out.clone(), notices.clone())).unwrap();

        assert_eq!(out.contents(), "welcome :)\nsecond\n");
        assert_eq!(
            notices.contents(),
            format!(
                "Connected to server at 127.0.0.1:{port}\nDisconnected from server: end of stream\n"
            )
        );
        assert_eq!(
            outcome,
            Outcome {
                connected: true,
                lines: 2,
                reason: "end of stream".to_string(),
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_run_reports_refused_connection() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let out = SharedBuf::default();
        let notices = SharedBuf::default();
        let outcome = run(local_config(port), Presenter::new(out.clone(), notices.clone())).unwrap();

        assert!(out.contents().is_empty());
        assert!(notices.contents().starts_with("Error connecting to server: "));
        assert!(!outcome.connected);
        assert_eq!(outcome.exit_code(), 1);
    }
}
