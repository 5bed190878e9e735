//! Error types shared by the library and the binary.

use thiserror::Error;

/// Errors raised at the fallible seams: storage, corpus loading, logging setup.
///
/// The scoring core never produces these; persistence failures inside the
/// high-score store are logged and swallowed before they reach a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the filesystem or terminal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No embedded corpus with this name.
    #[error("unknown corpus: {0}")]
    UnknownCorpus(String),

    /// Storage slot could not be read or written.
    #[error("storage unavailable: {message}")]
    Storage { message: String },

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {message}")]
    Logging { message: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
