use std::io;
use std::path::PathBuf;

/// Failures of the schoolhouse client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The service could not be reached or replied with an unreadable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error envelope.
    #[error("{message}")]
    Api {
        /// HTTP status of the reply.
        status: u16,
        /// `message` of the envelope, possibly empty.
        message: String,
    },

    /// A local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// An argument was refused before any request was made.
    #[error("{0}")]
    Invalid(String),
}

impl ClientError {
    /// The server-provided message, if the service sent a non-empty one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Result of client operations.
pub type ClientResult<T> = Result<T, ClientError>;
