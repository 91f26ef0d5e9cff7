//! UCI client errors.

use tactician_core::OracleError;

/// Errors that can occur while driving a UCI engine process.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The engine executable could not be started.
    #[error("failed to start engine {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The child process was started without a piped stdin or stdout.
    #[error("engine process has no {stream} pipe")]
    MissingPipe {
        /// `"stdin"` or `"stdout"`.
        stream: &'static str,
    },

    /// The engine closed its output.
    #[error("engine closed its output")]
    Closed,

    /// A keyword in engine output was not followed by a value.
    #[error("missing value for {field}")]
    MissingValue {
        /// The keyword missing its value.
        field: String,
    },

    /// A value in engine output could not be parsed.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The keyword the value belongs to.
        field: String,
        /// The value that failed to parse.
        value: String,
    },

    /// An I/O error occurred while talking to the engine.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl From<UciError> for OracleError {
    fn from(err: UciError) -> Self {
        OracleError::Backend(Box::new(err))
    }
}
