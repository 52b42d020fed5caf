//! Error types for TC3 signing and verification.
//!
//! Signing input errors are detected before any network effort and are never
//! turned into a best-effort signature. The remaining variants are produced
//! while verifying an incoming signed request.

/// Errors that can occur while signing or verifying a TC3 request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential pair is empty or not usable in a header.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The Unix timestamp cannot be mapped to a UTC calendar date.
    #[error("invalid request timestamp: {0}")]
    InvalidTimestamp(i64),

    /// The API action name is empty.
    #[error("missing API action")]
    MissingAction,

    /// A value that goes into a signed header is not a valid header value.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    /// The request parameters could not be serialized to JSON.
    #[error("failed to serialize request payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not `TC3-HMAC-SHA256`.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A required HTTP header referenced in `SignedHeaders` is missing.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The `X-TC-Timestamp` header is not an integer Unix timestamp.
    #[error("Invalid X-TC-Timestamp header: {0}")]
    InvalidTimestampHeader(String),

    /// The `Credential` component does not match
    /// `secret_id/date/service/tc3_request`, or disagrees with the timestamp.
    #[error("Invalid credential format")]
    InvalidCredential,

    /// The secret id was not found in the credential store.
    #[error("Secret id not found: {0}")]
    AccessKeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
