//! TC3-HMAC-SHA256 verification of incoming requests.
//!
//! This is the server-side mirror of [`crate::request::RequestBuilder`]:
//!
//! 1. Parse the `Authorization` header to extract the credential scope, the
//!    signed header names, and the provided signature.
//! 2. Reconstruct the canonical request from the signed headers and the body hash.
//! 3. Rebuild the string to sign from `X-TC-Timestamp` and the credential scope.
//! 4. Derive the scoped signing key and compare signatures in constant time.
//!
//! The main entry point is [`verify_tc3`].

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::CanonicalRequest;
use crate::credentials::CredentialProvider;
use crate::error::AuthError;
use crate::tc3::{
    ALGORITHM, SCOPE_TERMINATOR, SigningContext, build_string_to_sign, hash_payload, sign,
};

/// The result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    /// The secret id that signed the request.
    pub secret_id: String,
    /// The date of the credential scope.
    pub date: String,
    /// The service of the credential scope.
    pub service: String,
    /// The value of `X-TC-Action`, if it was signed.
    pub action: Option<String>,
    /// The headers that were included in the signature.
    pub signed_headers: Vec<String>,
}

/// Parsed components of a TC3 `Authorization` header.
///
/// Format:
/// ```text
/// TC3-HMAC-SHA256 Credential=AKID/2021-01-01/ai3d/tc3_request,
///   SignedHeaders=content-type;host, Signature=<hex-signature>
/// ```
#[derive(Debug, Clone)]
pub struct ParsedAuth {
    /// The signing algorithm (must be `TC3-HMAC-SHA256`).
    pub algorithm: String,
    /// The secret id.
    pub secret_id: String,
    /// The date component of the credential scope (`YYYY-MM-DD`).
    pub date: String,
    /// The service component of the credential scope.
    pub service: String,
    /// The list of signed header names (lowercase).
    pub signed_headers: Vec<String>,
    /// The hex-encoded signature.
    pub signature: String,
}

/// Parse a TC3 `Authorization` header value into its components.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] if the header format is invalid,
/// [`AuthError::UnsupportedAlgorithm`] if the algorithm is not
/// `TC3-HMAC-SHA256`, or [`AuthError::InvalidCredential`] if the credential
/// scope is malformed.
pub fn parse_authorization_header(header: &str) -> Result<ParsedAuth, AuthError> {
    let (algorithm, rest) = header.split_once(' ').ok_or(AuthError::InvalidAuthHeader)?;

    if algorithm != ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(algorithm.to_owned()));
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in rest.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("Credential=") {
            credential = Some(value);
        } else if let Some(value) = part.strip_prefix("SignedHeaders=") {
            signed_headers = Some(value);
        } else if let Some(value) = part.strip_prefix("Signature=") {
            signature = Some(value);
        }
    }

    let credential = credential.ok_or(AuthError::InvalidAuthHeader)?;
    let signed_headers = signed_headers.ok_or(AuthError::InvalidAuthHeader)?;
    let signature = signature.ok_or(AuthError::InvalidAuthHeader)?;

    // secret_id/date/service/tc3_request
    let cred_parts: Vec<&str> = credential.splitn(4, '/').collect();
    if cred_parts.len() != 4 || cred_parts[3] != SCOPE_TERMINATOR {
        return Err(AuthError::InvalidCredential);
    }

    Ok(ParsedAuth {
        algorithm: algorithm.to_owned(),
        secret_id: cred_parts[0].to_owned(),
        date: cred_parts[1].to_owned(),
        service: cred_parts[2].to_owned(),
        signed_headers: signed_headers.split(';').map(ToOwned::to_owned).collect(),
        signature: signature.to_owned(),
    })
}

/// Verify a TC3-signed HTTP request.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - The `Authorization` header is missing or malformed
/// - The credential date does not match the UTC date of `X-TC-Timestamp`
/// - The secret id is not found
/// - Required signed headers are missing
/// - The signature does not match
pub fn verify_tc3(
    parts: &http::request::Parts,
    body: &[u8],
    credential_provider: &dyn CredentialProvider,
) -> Result<VerifiedRequest, AuthError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    debug!(auth_header, "Parsing TC3 authorization header");

    let parsed = parse_authorization_header(auth_header)?;
    let secret_key = credential_provider.get_secret_key(&parsed.secret_id)?;

    let timestamp_str = extract_header_value(parts, "x-tc-timestamp")?;
    let timestamp: i64 = timestamp_str
        .parse()
        .map_err(|_| AuthError::InvalidTimestampHeader(timestamp_str.clone()))?;
    let context = SigningContext::from_timestamp(timestamp, &parsed.service)?;
    if context.date != parsed.date {
        return Err(AuthError::InvalidCredential);
    }

    let signed_header_refs: Vec<&str> = parsed.signed_headers.iter().map(String::as_str).collect();
    let header_pairs = collect_signed_headers(parts, &signed_header_refs)?;

    let canonical_request = CanonicalRequest::with_signed_headers(
        parts.method.as_str(),
        parts.uri.path(),
        parts.uri.query().unwrap_or(""),
        &header_pairs,
        &signed_header_refs,
        &hash_payload(body),
    );

    debug!(canonical_request = %canonical_request, "Rebuilt canonical request");

    let string_to_sign = build_string_to_sign(
        &timestamp_str,
        &context.credential_scope,
        &canonical_request.hash(),
    );
    let expected_signature = sign(&secret_key, &context.date, &context.service, &string_to_sign);

    if parsed
        .signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        debug!(secret_id = %parsed.secret_id, "Signature verification succeeded");
        let action = header_pairs
            .iter()
            .find(|(name, _)| *name == "x-tc-action")
            .map(|(_, value)| (*value).to_owned());
        Ok(VerifiedRequest {
            secret_id: parsed.secret_id,
            date: parsed.date,
            service: parsed.service,
            action,
            signed_headers: parsed.signed_headers,
        })
    } else {
        debug!(
            expected = %expected_signature,
            provided = %parsed.signature,
            "Signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Extract a header value as a string from the request parts.
fn extract_header_value(parts: &http::request::Parts, name: &str) -> Result<String, AuthError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| AuthError::MissingHeader(name.to_owned()))?
        .to_str()
        .map(ToOwned::to_owned)
        .map_err(|_| AuthError::MissingHeader(name.to_owned()))
}

/// Collect header name-value pairs for the specified signed headers.
fn collect_signed_headers<'a>(
    parts: &'a http::request::Parts,
    signed_headers: &[&'a str],
) -> Result<Vec<(&'a str, &'a str)>, AuthError> {
    let mut result = Vec::with_capacity(signed_headers.len());

    for &name in signed_headers {
        let value = parts
            .headers
            .get(name)
            .ok_or_else(|| AuthError::MissingHeader(name.to_owned()))?
            .to_str()
            .map_err(|_| AuthError::MissingHeader(name.to_owned()))?;
        result.push((name, value));
    }

    Ok(result)
}
