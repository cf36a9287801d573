//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server (or the local check) rejected the display name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
