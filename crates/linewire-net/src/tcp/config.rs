//! Configuration types for the line client.

use std::path::Path;
use std::time::Duration;

use linewire_core::logging::targets;
use serde::Deserialize;

use crate::Result;
use crate::error::NetworkError;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8081;
/// Name given to the dedicated connection thread.
pub const DEFAULT_THREAD_NAME: &str = "linewire-connection";

/// Host and port of the server to connect to.
///
/// An endpoint is immutable once built. The port is always in `1..=65535`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint, rejecting an empty host or port 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(NetworkError::invalid_endpoint("host must not be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(NetworkError::invalid_endpoint(format!(
                "host '{trimmed}' must not contain whitespace"
            )));
        }
        if port == 0 {
            return Err(NetworkError::invalid_endpoint("port must be in 1..=65535"));
        }

        // Accept "[::1]" as well as "::1"; the resolver wants the bare form.
        let host = trimmed
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(trimmed)
            .to_string();

        Ok(Self { host, port })
    }

    /// The host name or IP literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the address string (host:port).
    pub fn address(&self) -> String {
        self.to_string()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Configuration for a line client connection.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use linewire_net::tcp::{Endpoint, LineClientConfig};
///
/// let config = LineClientConfig::new(Endpoint::new("127.0.0.1", 8081).unwrap())
///     .connect_timeout(Duration::from_secs(5))
///     .thread_name("feed-reader");
///
/// assert_eq!(config.address(), "127.0.0.1:8081");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineClientConfig {
    /// The server to connect to.
    pub endpoint: Endpoint,
    /// Connection timeout. `None` blocks until the OS gives up.
    pub connect_timeout: Option<Duration>,
    /// Name for the dedicated connection thread.
    pub thread_name: String,
}

impl Default for LineClientConfig {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

impl LineClientConfig {
    /// Create a new client configuration.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            connect_timeout: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disable connection timeout.
    pub fn no_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }

    /// Set the name of the connection thread.
    ///
    /// A name containing a NUL byte makes [`ConnectionWorker::start`] fail
    /// with [`NetworkError::Spawn`].
    ///
    /// [`ConnectionWorker::start`]: super::ConnectionWorker::start
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Get the address string (host:port).
    pub fn address(&self) -> String {
        self.endpoint.address()
    }

    /// Parse a configuration from TOML.
    ///
    /// All keys live under a `[connection]` table and are optional:
    ///
    /// ```toml
    /// [connection]
    /// host = "127.0.0.1"
    /// port = 8081
    /// connect_timeout_ms = 5000
    /// thread_name = "linewire-connection"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(source)?;
        file.connection.into_config()
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(target: targets::NET, path = %path.display(), "loading configuration");
        let source = std::fs::read_to_string(path).map_err(|e| NetworkError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

/// On-disk layout of a configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    connection: ConnectionSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConnectionSection {
    host: String,
    port: u32,
    connect_timeout_ms: Option<u64>,
    thread_name: String,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: u32::from(DEFAULT_PORT),
            connect_timeout_ms: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl ConnectionSection {
    fn into_config(self) -> Result<LineClientConfig> {
        let port = u16::try_from(self.port).map_err(|_| {
            NetworkError::invalid_endpoint(format!("port {} is out of range 1..=65535", self.port))
        })?;
        let mut config = LineClientConfig::new(Endpoint::new(self.host, port)?);
        if let Some(ms) = self.connect_timeout_ms {
            if ms == 0 {
                return Err(NetworkError::Config(
                    "connect_timeout_ms must be greater than zero".to_string(),
                ));
            }
            config = config.connect_timeout(Duration::from_millis(ms));
        }
        if self.thread_name.contains('\0') {
            return Err(NetworkError::Config(
                "thread_name must not contain NUL bytes".to_string(),
            ));
        }
        if !self.thread_name.is_empty() {
            config = config.thread_name(self.thread_name);
        }
        Ok(config)
    }
}
