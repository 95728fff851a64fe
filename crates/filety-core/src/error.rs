//! Unified error handling for filety-core

use std::time::Duration;

use thiserror::Error;

/// Core error type for filety-core
///
/// The type is `Clone` because a token refresh result is shared between
/// every caller waiting on the same in-flight refresh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Network unreachable, connection reset, request aborted
    #[error("Network error: {0}")]
    Transport(String),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Machine-readable error code, when the server sends one
        code: Option<String>,
    },

    /// Authentication failed even after a token refresh
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    /// Response is missing an expected field or cannot be decoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server reported the transcription job as failed
    #[error("Transcription failed: {0}")]
    JobFailed(String),

    /// Usage quota is depleted; the message is user-facing
    #[error("{0}")]
    QuotaExceeded(String),

    /// The overall workflow deadline elapsed
    #[error("Deadline of {}s exceeded", .0.as_secs())]
    DeadlineExceeded(Duration),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for filety-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error without a structured code
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Error::Http {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Structured server error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is an authentication failure (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message suitable for showing to a person, without the kind prefix
    pub fn user_message(&self) -> String {
        match self {
            Error::Transport(msg)
            | Error::Unauthorized(msg)
            | Error::Protocol(msg)
            | Error::JobFailed(msg)
            | Error::QuotaExceeded(msg)
            | Error::Io(msg)
            | Error::Config(msg)
            | Error::Validation(msg) => msg.clone(),
            Error::Http { message, .. } => message.clone(),
            Error::DeadlineExceeded(_) => {
                "The server took too long to process the file. Please try again.".to_string()
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport("Request timed out".to_string())
        } else if err.is_connect() {
            Error::Transport("Connection failed".to_string())
        } else if err.is_builder() {
            Error::Config(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(err.to_string())
    }
}

// Convert to String for CLI display
impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
