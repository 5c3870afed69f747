//! Helper functions for creating and classifying errors

use super::types::BlestError;

impl BlestError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn status<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether re-sending the same batch could plausibly succeed.
    ///
    /// The engine never retries on its own; this is for callers that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            BlestError::HttpClient(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            BlestError::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            BlestError::Io(_) => true,
            _ => false,
        }
    }

    /// Whether this error came from loading or normalizing configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, BlestError::Config(_) | BlestError::Yaml(_))
    }
}
