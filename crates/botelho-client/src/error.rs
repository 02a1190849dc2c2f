//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the `botelho` binary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A secret reference could not be resolved.
    #[error("secret error: {0}")]
    Secret(String),

    /// A remote source failed.
    #[error("{0}")]
    Provider(#[from] botelho_providers::ProviderError),

    /// The running bot failed.
    #[error("{0}")]
    Server(#[from] botelho_server::ServerError),

    /// Logging could not be initialised.
    #[error("logging error: {0}")]
    Tracing(#[from] botelho_core::TracingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ClientError::Config("bad timezone".into()).to_string(),
            "configuration error: bad timezone"
        );
        let err: ClientError = botelho_providers::ProviderError::timeout("slow").into();
        assert!(err.to_string().contains("slow"));
    }
}
