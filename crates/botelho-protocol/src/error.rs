//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding Bot API traffic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to serialize or deserialize a payload.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API answered with `ok: false`.
    #[error("bot API error{}: {description}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
    Api {
        /// Numeric error code, when the API provides one.
        code: Option<i64>,
        /// Human-readable description from the API.
        description: String,
    },

    /// The API answered with `ok: true` but no `result`.
    #[error("bot API response has no result")]
    MissingResult,
}

impl ProtocolError {
    /// Creates an API error.
    pub fn api(code: Option<i64>, description: impl Into<String>) -> Self {
        Self::Api {
            code,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        assert_eq!(
            ProtocolError::api(Some(401), "Unauthorized").to_string(),
            "bot API error 401: Unauthorized"
        );
        assert_eq!(
            ProtocolError::api(None, "Bad Request").to_string(),
            "bot API error: Bad Request"
        );
    }
}
