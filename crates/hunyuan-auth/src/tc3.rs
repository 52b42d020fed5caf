//! TC3-HMAC-SHA256 signing key derivation and signature computation.
//!
//! The signing key is derived through a fixed HMAC-SHA256 chain:
//!
//! ```text
//! SecretDate    = HMAC-SHA256("TC3" + secret_key, date)
//! SecretService = HMAC-SHA256(SecretDate, service)
//! SecretSigning = HMAC-SHA256(SecretService, "tc3_request")
//! Signature     = hex(HMAC-SHA256(SecretSigning, string_to_sign))
//! ```
//!
//! Intermediate keys stay raw bytes; only the final signature is hex-encoded.
//! The key is derived again for every request because `date` rolls over at
//! UTC midnight.

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// The signing algorithm name.
pub const ALGORITHM: &str = "TC3-HMAC-SHA256";

/// Terminator of the credential scope and message of the last key derivation step.
pub const SCOPE_TERMINATOR: &str = "tc3_request";

type HmacSha256 = Hmac<Sha256>;

/// Date and service a signature is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// UTC calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Service name.
    pub service: String,
    /// `date/service/tc3_request`.
    pub credential_scope: String,
}

impl SigningContext {
    /// Create a context from an already formatted date.
    #[must_use]
    pub fn new(date: impl Into<String>, service: impl Into<String>) -> Self {
        let date = date.into();
        let service = service.into();
        let credential_scope = credential_scope(&date, &service);
        Self {
            date,
            service,
            credential_scope,
        }
    }

    /// Create a context from a Unix timestamp, using its UTC calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTimestamp`] for negative timestamps or
    /// timestamps outside the representable date range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hunyuan_auth::SigningContext;
    ///
    /// let ctx = SigningContext::from_timestamp(1_609_459_199, "ai3d").unwrap();
    /// assert_eq!(ctx.date, "2020-12-31");
    /// assert_eq!(ctx.credential_scope, "2020-12-31/ai3d/tc3_request");
    /// ```
    pub fn from_timestamp(timestamp: i64, service: &str) -> Result<Self, AuthError> {
        if timestamp < 0 {
            return Err(AuthError::InvalidTimestamp(timestamp));
        }
        let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or(AuthError::InvalidTimestamp(timestamp))?;
        Ok(Self::new(datetime.format("%Y-%m-%d").to_string(), service))
    }
}

/// Build the credential scope `date/service/tc3_request`.
#[must_use]
pub fn credential_scope(date: &str, service: &str) -> String {
    format!("{date}/{service}/{SCOPE_TERMINATOR}")
}

/// Build the TC3 string to sign.
///
/// Format:
/// ```text
/// TC3-HMAC-SHA256\n
/// <unix timestamp>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
///
/// # Examples
///
/// ```
/// use hunyuan_auth::tc3::build_string_to_sign;
///
/// let sts = build_string_to_sign("1609459200", "2021-01-01/ai3d/tc3_request", "abc");
/// assert_eq!(sts, "TC3-HMAC-SHA256\n1609459200\n2021-01-01/ai3d/tc3_request\nabc");
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the scoped signing key.
#[must_use]
pub fn derive_signing_key(secret_key: &[u8], date: &str, service: &str) -> Vec<u8> {
    let mut prefixed = Vec::with_capacity(secret_key.len() + 3);
    prefixed.extend_from_slice(b"TC3");
    prefixed.extend_from_slice(secret_key);

    let secret_date = hmac_sha256(&prefixed, date.as_bytes());
    let secret_service = hmac_sha256(&secret_date, service.as_bytes());
    hmac_sha256(&secret_service, SCOPE_TERMINATOR.as_bytes())
}

/// Compute the hex-encoded HMAC-SHA256 of `data` with the given signing key.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Sign `string_to_sign` with a key derived from `secret_key`, `date` and `service`.
///
/// Returns a 64-character lowercase hex string.
///
/// # Examples
///
/// ```
/// use hunyuan_auth::sign;
///
/// let signature = sign(b"test_key", "2021-01-01", "ai3d", "hello");
/// assert_eq!(signature.len(), 64);
/// assert_eq!(signature, sign(b"test_key", "2021-01-01", "ai3d", "hello"));
/// ```
#[must_use]
pub fn sign(secret_key: &[u8], date: &str, service: &str, string_to_sign: &str) -> String {
    let signing_key = derive_signing_key(secret_key, date, service);
    compute_signature(&signing_key, string_to_sign)
}

/// Compute the SHA-256 hash of the given payload and return it as a hex string.
///
/// # Examples
///
/// ```
/// use hunyuan_auth::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
