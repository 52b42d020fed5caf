//! Signed request assembly.
//!
//! [`RequestBuilder`] turns an API action, its JSON parameters and a captured
//! timestamp into the exact body and header set to transmit:
//!
//! 1. Serialize the parameters; the body bytes are the bytes that get hashed.
//! 2. Build the `Host`, `Content-Type`, `X-TC-Action`, `X-TC-Version`,
//!    `X-TC-Region` and `X-TC-Timestamp` headers. All of them are signed.
//! 3. Build the canonical request and hash it.
//! 4. Build the string to sign and sign it with the scoped key.
//! 5. Emit the `Authorization` header.
//!
//! The builder performs no I/O and has no hidden randomness: identical inputs
//! produce byte-identical output.

use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use hunyuan_core::ApiEndpoint;
use serde::Serialize;
use tracing::debug;

use crate::canonical::CanonicalRequest;
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::tc3::{ALGORITHM, SigningContext, build_string_to_sign, hash_payload, sign};

/// Content type of every request body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A fully signed request, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// The timestamp the request was signed for.
    pub timestamp: i64,
    /// Headers to send, in emission order, `Authorization` last.
    pub headers: Vec<(String, String)>,
    /// JSON body; exactly the bytes whose hash was signed.
    pub body: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

impl SignedRequest {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert the headers into an [`http::HeaderMap`].
    pub fn header_map(&self) -> Result<HeaderMap, AuthError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AuthError::InvalidHeaderValue(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| AuthError::InvalidHeaderValue(name.clone()))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// Builds TC3-signed requests for one credential pair and one endpoint.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    credentials: Arc<Credentials>,
    endpoint: ApiEndpoint,
}

impl RequestBuilder {
    /// Create a builder.
    pub fn new(credentials: impl Into<Arc<Credentials>>, endpoint: ApiEndpoint) -> Self {
        Self {
            credentials: credentials.into(),
            endpoint,
        }
    }

    /// The endpoint requests are signed for.
    #[must_use]
    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    /// The credentials requests are signed with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build and sign a request for `action` with `params` as the JSON body.
    ///
    /// `timestamp` is the Unix time in seconds; it is used both for the
    /// `X-TC-Timestamp` header and for the UTC date of the credential scope.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the action is empty, a header value is not
    /// a valid HTTP header value, the parameters fail to serialize, or the
    /// timestamp has no UTC date.
    pub fn build_signed_request<T>(
        &self,
        action: &str,
        params: &T,
        timestamp: i64,
    ) -> Result<SignedRequest, AuthError>
    where
        T: Serialize + ?Sized,
    {
        if action.trim().is_empty() {
            return Err(AuthError::MissingAction);
        }
        let context = SigningContext::from_timestamp(timestamp, &self.endpoint.service)?;

        let body = serde_json::to_string(params)?;
        let payload_hash = hash_payload(body.as_bytes());

        let timestamp_str = timestamp.to_string();
        let mut headers: Vec<(String, String)> = vec![
            ("Host".to_owned(), self.endpoint.host.clone()),
            ("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned()),
            ("X-TC-Action".to_owned(), action.to_owned()),
            ("X-TC-Version".to_owned(), self.endpoint.version.clone()),
            ("X-TC-Region".to_owned(), self.endpoint.region.as_str().to_owned()),
            ("X-TC-Timestamp".to_owned(), timestamp_str.clone()),
        ];
        for (name, value) in &headers {
            if value.is_empty() || HeaderValue::from_str(value).is_err() {
                return Err(AuthError::InvalidHeaderValue(name.clone()));
            }
        }

        let header_refs: Vec<(&str, &str)> = headers
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        let canonical_request = CanonicalRequest::new(&header_refs, &payload_hash);

        debug!(canonical_request = %canonical_request, "Built canonical request");

        let string_to_sign = build_string_to_sign(
            &timestamp_str,
            &context.credential_scope,
            &canonical_request.hash(),
        );

        debug!(string_to_sign, "Built string to sign");

        let signature = sign(
            self.credentials.secret_key(),
            &context.date,
            &context.service,
            &string_to_sign,
        );
        let authorization = format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={signature}",
            self.credentials.secret_id(),
            context.credential_scope,
            canonical_request.signed_headers,
        );
        headers.push(("Authorization".to_owned(), authorization.clone()));

        Ok(SignedRequest {
            timestamp,
            headers,
            body,
            authorization,
        })
    }
}
