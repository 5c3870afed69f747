//! Conversions from engine errors into per-request outcome errors

use super::types::BlestError;
use crate::core::types::{OutcomeError, OutcomeErrorKind};

impl From<&BlestError> for OutcomeError {
    fn from(err: &BlestError) -> Self {
        let kind = match err {
            BlestError::Status { .. } => OutcomeErrorKind::Status,
            BlestError::Serialization(_) => OutcomeErrorKind::Decode,
            BlestError::Disposed => OutcomeErrorKind::Disposed,
            _ => OutcomeErrorKind::Transport,
        };
        let details = match err {
            BlestError::Status { status, .. } => Some(serde_json::json!({ "status": status })),
            _ => None,
        };

        OutcomeError {
            kind,
            message: err.to_string(),
            details,
        }
    }
}

impl From<BlestError> for OutcomeError {
    fn from(err: BlestError) -> Self {
        OutcomeError::from(&err)
    }
}
