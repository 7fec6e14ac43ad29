//! linewire binary.
//!
//! Connects to a TCP server, prints every received line to stdout, and
//! reports connection status on stderr.
//!
//! # Usage
//!
//! ```bash
//! # Connect to the default endpoint (127.0.0.1:8081)
//! linewire
//!
//! # Connect elsewhere, giving up on the connect after two seconds
//! linewire --host 10.0.0.2 --port 9100 --connect-timeout-ms 2000
//!
//! # Read settings from a file; flags still win
//! linewire --config linewire.toml --log-level debug
//!
//! # Server runs on an attached Android device
//! linewire --adb forward
//! ```

mod adb;
mod error;
mod presenter;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use linewire_net::tcp::{Endpoint, LineClientConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use adb::{AdbMapping, AdbPortMap, DEFAULT_ADB};
use error::AppError;
use presenter::Presenter;

/// Exit status when configuration is invalid.
const EXIT_USAGE: u8 = 2;

/// Line client
#[derive(Parser, Debug)]
#[command(name = "linewire")]
#[command(about = "Print newline-delimited text received from a TCP server")]
#[command(version)]
struct Args {
    /// Server host (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Give up connecting after this many milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout_ms: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map the port through adb before connecting
    #[arg(long, value_enum)]
    adb: Option<AdbMapping>,

    /// adb executable used by --adb
    #[arg(long, default_value = DEFAULT_ADB)]
    adb_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    /// Build the client configuration: defaults, then the file, then flags.
    fn client_config(&self) -> Result<LineClientConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => LineClientConfig::load(path)?,
            None => LineClientConfig::default(),
        };

        if self.host.is_some() || self.port.is_some() {
            let host = self
                .host
                .clone()
                .unwrap_or_else(|| config.endpoint.host().to_string());
            let port = self.port.unwrap_or(config.endpoint.port());
            config.endpoint = Endpoint::new(host, port)?;
        }

        if let Some(ms) = self.connect_timeout_ms {
            config = config.connect_timeout(Duration::from_millis(ms));
        }

        Ok(config)
    }

    /// The adb invocation requested with `--adb`, for the configured port.
    fn adb_port_map(&self, config: &LineClientConfig) -> Option<AdbPortMap> {
        self.adb
            .map(|mapping| AdbPortMap::new(&self.adb_path, mapping, config.endpoint.port()))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the received lines only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = match args.client_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("linewire: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if let Some(port_map) = args.adb_port_map(&config) {
        if let Err(e) = port_map.apply() {
            eprintln!("linewire: {e}");
            return ExitCode::FAILURE;
        }
    }

    match presenter::run(config, Presenter::new(io::stdout(), io::stderr())) {
        Ok(outcome) => {
            tracing::info!(
                connected = outcome.connected,
                lines = outcome.lines,
                reason = %outcome.reason,
                "connection finished"
            );
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            eprintln!("linewire: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("linewire").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).client_config().unwrap();
        assert_eq!(config, LineClientConfig::default());
        assert_eq!(config.address(), "127.0.0.1:8081");
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linewire.toml");
        std::fs::write(
            &path,
            "[connection]\nhost = \"10.0.0.2\"\nport = 9100\nconnect_timeout_ms = 500\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let from_file = parse(&["--config", path]).client_config().unwrap();
        assert_eq!(from_file.address(), "10.0.0.2:9100");
        assert_eq!(from_file.connect_timeout, Some(Duration::from_millis(500)));

        let overridden = parse(&["--config", path, "--port", "7000", "--connect-timeout-ms", "50"])
            .client_config()
            .unwrap();
        assert_eq!(overridden.address(), "10.0.0.2:7000");
        assert_eq!(overridden.connect_timeout, Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let argv = ["linewire", "--port", "0"];
        assert!(Args::try_parse_from(argv).is_err());
        let argv = ["linewire", "--connect-timeout-ms", "0"];
        assert!(Args::try_parse_from(argv).is_err());

        let err = parse(&["--host", " "]).client_config().unwrap_err();
        assert!(matches!(
            err,
            AppError::Network(linewire_net::NetworkError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_adb_mapping_uses_configured_port() {
        let args = parse(&["--port", "9100"]);
        let config = args.client_config().unwrap();
        assert!(args.adb_port_map(&config).is_none());

        let args = parse(&["--port", "9100", "--adb", "forward", "--adb-path", "/opt/adb"]);
        let config = args.client_config().unwrap();
        let port_map = args.adb_port_map(&config).unwrap();
        assert_eq!(port_map, AdbPortMap::new("/opt/adb", AdbMapping::Forward, 9100));

        assert!(Args::try_parse_from(["linewire", "--adb", "sideways"]).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = parse(&["--config", "/nonexistent/linewire.toml"])
            .client_config()
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/linewire.toml"));
    }
}
