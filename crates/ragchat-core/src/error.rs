//! Error types for ragchat.

use thiserror::Error;

/// Result type alias using ragchat's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ragchat operations.
///
/// Failures reported by the backend with a structured `detail` message are
/// collapsed into [`Error::Api`], which carries the message and nothing else.
/// Every other transport or status failure keeps the original
/// [`reqwest::Error`] in [`Error::Transport`].
#[derive(Error, Debug)]
pub enum Error {
    /// Server-reported failure; displays as the bare message.
    #[error("{0}")]
    Api(String),

    /// HTTP/network request failed (original error, unmodified)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Invalid input, rejected before any request is sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by a transport error, if any.
    ///
    /// Always `None` for [`Error::Api`]: the status is dropped when the
    /// server's message is surfaced.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether this error came from a server-supplied message.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
