//! Error types for the Hunyuan client.
//!
//! Signing errors are fatal and surface before any network effort. Transport,
//! API and protocol errors describe a single failed call; the poller counts
//! them as failed attempts instead of aborting.

use std::path::PathBuf;

use hunyuan_auth::AuthError;

/// Errors produced by [`crate::HunyuanClient`] and the transports.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be signed.
    #[error("failed to sign request: {0}")]
    Signing(#[from] AuthError),

    /// The HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status and no JSON body.
    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The API reported an error in `Response.Error`.
    #[error("API error {code}: {message}")]
    Api {
        /// Error code, e.g. `AuthFailure.SignatureFailure`.
        code: String,
        /// Human readable message.
        message: String,
        /// Request id echoed by the API.
        request_id: Option<String>,
    },

    /// The response did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The job parameters were rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A local file or directory could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A downloaded archive could not be unpacked.
    #[error("failed to extract archive: {0}")]
    Archive(String),
}

impl ClientError {
    /// Whether this error means the request could not be signed at all.
    #[must_use]
    pub fn is_signing(&self) -> bool {
        matches!(self, Self::Signing(_))
    }
}

impl ClientError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
