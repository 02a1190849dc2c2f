//! Server error types.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the running bot.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A remote source failed.
    #[error("Source error: {0}")]
    Provider(#[from] botelho_providers::ProviderError),

    /// The Bot API rejected a call or sent something undecodable.
    #[error("Protocol error: {0}")]
    Protocol(#[from] botelho_protocol::ProtocolError),

    /// The Bot API could not be reached.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Shutdown requested.
    #[error("Bot shutdown requested")]
    Shutdown,
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
