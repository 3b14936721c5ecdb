//! Error types for the procmine library.

use thiserror::Error;

/// Main error type for procmine operations.
#[derive(Debug, Error)]
pub enum ProcmineError {
    /// The remote returned a non-2xx HTTP status.
    #[error("request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// A 2xx response body did not have the promised shape.
    #[error("malformed response body: {message}")]
    Protocol { message: String },

    /// A unique-name lookup matched zero or more than one log.
    #[error("found {matches} logs named '{name}', expected exactly one")]
    AmbiguousName { name: String, matches: usize },

    /// A log id or name could not be resolved at all.
    #[error("log not found: {0}")]
    NotFound(String),

    /// Error from the underlying HTTP transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Local JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Empty table or CSV body with no data.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading a file or stream.
    #[error("IO error reading {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for procmine operations.
pub type Result<T> = std::result::Result<T, ProcmineError>;
