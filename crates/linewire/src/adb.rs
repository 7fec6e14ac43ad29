//! Port mapping through adb for servers or clients on an Android device.
//!
//! `adb reverse tcp:PORT tcp:PORT` lets a client on the device dial its own
//! `127.0.0.1:PORT` and reach this machine. `adb forward` is the opposite
//! direction: connecting to `127.0.0.1:PORT` here reaches a server on the
//! device, which is what linewire needs when the device is the server.

use std::path::PathBuf;
use std::process::Command;

use clap::ValueEnum;

use crate::error::AppError;

/// Program used when no `--adb-path` is given.
pub const DEFAULT_ADB: &str = "adb";

/// Which side of the adb link listens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AdbMapping {
    /// Device port -> host port.
    Reverse,
    /// Host port -> device port.
    Forward,
}

impl AdbMapping {
    fn subcommand(self) -> &'static str {
        match self {
            Self::Reverse => "reverse",
            Self::Forward => "forward",
        }
    }
}

/// A single `adb reverse|forward tcp:PORT tcp:PORT` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdbPortMap {
    program: PathBuf,
    mapping: AdbMapping,
    port: u16,
}

impl AdbPortMap {
    pub fn new(program: impl Into<PathBuf>, mapping: AdbMapping, port: u16) -> Self {
        Self {
            program: program.into(),
            mapping,
            port,
        }
    }

    fn command(&self) -> Command {
        let spec = format!("tcp:{}", self.port);
        let mut command = Command::new(&self.program);
        command.args([self.mapping.subcommand(), spec.as_str(), spec.as_str()]);
        command
    }

    /// Run adb and wait for it, so the mapping exists before connecting.
    ///
    /// adb's own output is captured; only its stderr is surfaced, on failure.
    pub fn apply(&self) -> Result<(), AppError> {
        let program = self.program.display().to_string();
        tracing::info!(%program, mapping = ?self.mapping, port = self.port, "mapping port through adb");

        let output = self.command().output().map_err(|e| AppError::AdbSpawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(AppError::AdbFailed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_command_line() {
        let reverse = AdbPortMap::new(DEFAULT_ADB, AdbMapping::Reverse, 8081).command();
        assert_eq!(reverse.get_program(), OsStr::new("adb"));
        assert_eq!(
            reverse.get_args().collect::<Vec<_>>(),
            ["reverse", "tcp:8081", "tcp:8081"]
        );

        let forward = AdbPortMap::new("/opt/android/adb", AdbMapping::Forward, 9100).command();
        assert_eq!(forward.get_program(), OsStr::new("/opt/android/adb"));
        assert_eq!(
            forward.get_args().collect::<Vec<_>>(),
            ["forward", "tcp:9100", "tcp:9100"]
        );
    }

    #[test]
    fn test_missing_program() {
        let err = AdbPortMap::new("/nonexistent/adb", AdbMapping::Reverse, 8081)
            .apply()
            .unwrap_err();
        assert!(matches!(err, AppError::AdbSpawn { ref program, .. } if program == "/nonexistent/adb"));
        assert!(err.to_string().starts_with("Failed to run '/nonexistent/adb'"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        // `true` and `false` ignore their arguments
        assert!(AdbPortMap::new("true", AdbMapping::Reverse, 8081).apply().is_ok());

        let err = AdbPortMap::new("false", AdbMapping::Forward, 8081)
            .apply()
            .unwrap_err();
        assert!(matches!(err, AppError::AdbFailed { .. }));
    }
}
