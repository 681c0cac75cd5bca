//! Error types for the reference capabilities.
//!
//! These never escape a capability: `Action::execute` logs them and
//! returns.

use thiserror::Error;

/// Result type alias for supervisor restarts.
pub type RestartResult<T> = Result<T, RestartError>;

/// Ways a `supervisorctl restart` invocation can fail.
#[derive(Debug, Error)]
pub enum RestartError {
    #[error("{0} command not found, make sure Supervisor is installed and in PATH")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with {code:?}\nstdout: {stdout}\nstderr: {stderr}")]
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}
