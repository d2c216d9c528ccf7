use thiserror::Error;

use super::normalize::NormalizeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("cannot convert default_value {original} (sanitized: {sanitized}) to a bool")]
    Coercion { original: String, sanitized: String },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("token is missing from the API response")]
    MissingToken,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::SchemaViolation(message) => ApiError::SchemaViolation(message),
            NormalizeError::Coercion {
                original,
                sanitized,
            } => ApiError::Coercion {
                original,
                sanitized,
            },
        }
    }
}
