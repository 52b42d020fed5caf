//! Credentials and credential provider implementations.
//!
//! [`Credentials`] is the immutable secret id / secret key pair used to sign
//! outgoing requests. [`CredentialProvider`] resolves secret keys by secret id
//! when verifying incoming requests; [`StaticCredentialProvider`] is an
//! in-memory implementation for tests and local tooling.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// A Tencent Cloud API credential pair.
///
/// The secret key is treated as opaque bytes and never appears in `Debug`
/// output.
///
/// # Examples
///
/// ```
/// use hunyuan_auth::Credentials;
///
/// let credentials = Credentials::new("AKIDEXAMPLE", "secret").unwrap();
/// assert_eq!(credentials.secret_id(), "AKIDEXAMPLE");
/// assert!(Credentials::new("", "secret").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    secret_id: String,
    secret_key: Vec<u8>,
}

impl Credentials {
    /// Create a validated credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if either part is empty or the
    /// secret id contains whitespace or control characters.
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<Vec<u8>>,
    ) -> Result<Self, AuthError> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();

        if secret_id.is_empty() {
            return Err(AuthError::InvalidCredentials("secret id is empty".to_owned()));
        }
        if secret_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ',' || c == '/')
        {
            return Err(AuthError::InvalidCredentials(
                "secret id contains characters not allowed in a credential".to_owned(),
            ));
        }
        if secret_key.is_empty() {
            return Err(AuthError::InvalidCredentials("secret key is empty".to_owned()));
        }

        Ok(Self {
            secret_id,
            secret_key,
        })
    }

    /// The public secret id.
    #[must_use]
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// The raw secret key.
    #[must_use]
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Trait for looking up secret keys by secret id.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the secret key for the given secret id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the secret id is not recognized.
    fn get_secret_key(&self, secret_id: &str) -> Result<Vec<u8>, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credentials>,
}

impl StaticCredentialProvider {
    /// Create a provider from an iterable of credential pairs.
    pub fn new(credentials: impl IntoIterator<Item = Credentials>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|c| (c.secret_id.clone(), c))
                .collect(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_secret_key(&self, secret_id: &str) -> Result<Vec<u8>, AuthError> {
        self.credentials
            .get(secret_id)
            .map(|c| c.secret_key.clone())
            .ok_or_else(|| AuthError::AccessKeyNotFound(secret_id.to_owned()))
    }
}
