//! Error types for the optiprofit-core library.

use thiserror::Error;

/// Main error type for the optiprofit library.
#[derive(Error, Debug)]
pub enum OptiError {
    /// Field extraction error (remote extractors only).
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// History persistence error.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by remote extractors.
///
/// The local keyword extractor never fails; absent values are not errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The API key environment variable is not set.
    #[error("missing {0}")]
    MissingApiKey(String),

    /// Transport-level failure talking to the remote service.
    #[cfg(feature = "remote")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("remote error: {status} {body}")]
    Api { status: u16, body: String },

    /// The model reply contained no JSON object.
    #[error("no JSON object found in response")]
    NoJsonObject,

    /// The JSON object could not be decoded.
    #[error("malformed JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    /// The model reply had no message content.
    #[error("empty response from model")]
    EmptyResponse,

    /// The extractor was compiled out (built without the `remote` feature).
    #[error("extractor not available in this build: {0}")]
    Unavailable(String),
}

/// Errors related to the history store.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Failed to write the history file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the history file.
    #[error("failed to clear {path}: {source}")]
    Clear {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize entries.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for the optiprofit library.
pub type Result<T> = std::result::Result<T, OptiError>;
