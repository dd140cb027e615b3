//! Error types for the docker driver

use ghr_core::FleetError;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur when driving the docker CLI
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The docker binary could not be executed
    #[error("Failed to execute '{binary}'. Is docker installed? ({source})")]
    BinaryMissing {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The CLI ran but could not reach the daemon
    #[error("Cannot connect to the docker daemon: {0}")]
    DaemonUnreachable(String),

    /// A docker command exited with an error
    #[error("'{command}' failed (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Failed to read command output
    #[error("Unexpected docker output: {0}")]
    Parse(String),
}

impl RuntimeError {
    /// Classifies a failed command from its stderr
    pub fn from_failure(command: String, code: i32, stderr: &str) -> Self {
        let stderr = stderr.trim().to_string();

        if is_daemon_unreachable(&stderr) {
            RuntimeError::DaemonUnreachable(stderr)
        } else {
            RuntimeError::CommandFailed {
                command,
                code,
                stderr,
            }
        }
    }

    /// Check if the daemon or binary could not be used at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RuntimeError::BinaryMissing { .. } | RuntimeError::DaemonUnreachable(_)
        )
    }
}

fn is_daemon_unreachable(stderr: &str) -> bool {
    const MARKERS: [&str; 3] = [
        "Cannot connect to the Docker daemon",
        "error during connect",
        "Is the docker daemon running",
    ];
    MARKERS.iter().any(|marker| stderr.contains(marker))
}

impl From<RuntimeError> for FleetError {
    fn from(err: RuntimeError) -> Self {
        if err.is_unavailable() {
            FleetError::runtime_unavailable(err.to_string())
        } else {
            FleetError::Runtime(err.to_string())
        }
    }
}
