//! Error types for epistats-core

use thiserror::Error;

/// Main error type for the epistats-core library
///
/// Fatal-per-cycle conditions (transport failures, malformed response lines,
/// history-store I/O) surface as variants here. A metric that is merely
/// missing from a cycle is modeled as an absent snapshot field, not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// History store error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed line in a Splunk search response
    #[error("parse error in search response line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Splunk transport or API error
    #[error("splunk error: {0}")]
    Splunk(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for epistats-core
pub type Result<T> = std::result::Result<T, Error>;
