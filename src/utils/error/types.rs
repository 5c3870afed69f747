//! Error type definitions

use thiserror::Error;

/// Result type alias for the batching client
pub type Result<T> = std::result::Result<T, BlestError>;

/// Main error type for the batching client
#[derive(Error, Debug)]
pub enum BlestError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch endpoint answered with a non-success status
    #[error("Batch endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The client was disposed before the request could be dispatched
    #[error("Client disposed")]
    Disposed,

    /// No async runtime available
    #[error("Runtime error: {0}")]
    Runtime(String),
}
