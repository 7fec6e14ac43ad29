//! Error type for the linewire binary.

use linewire_core::CoreError;
use linewire_net::NetworkError;

/// Errors that stop the client before the connection attempt completes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration or worker start-up failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The presentation queue stopped early.
    #[error(transparent)]
    Queue(#[from] CoreError),

    /// The adb executable could not be started.
    #[error("Failed to run '{program}': {message}")]
    AdbSpawn {
        /// Program that was invoked.
        program: String,
        /// Description of the underlying I/O failure.
        message: String,
    },

    /// adb ran but did not set up the port mapping.
    #[error("'{program}' exited with {status}: {stderr}")]
    AdbFailed {
        /// Program that was invoked.
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed stderr output.
        stderr: String,
    },
}
