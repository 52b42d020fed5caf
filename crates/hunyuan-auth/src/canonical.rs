//! Canonical request construction for TC3-HMAC-SHA256.
//!
//! The canonical request has the following layout:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Requests to the Hunyuan API are always `POST /` with an empty query string,
//! so only the header block and the payload hash vary between requests. Header
//! names are lowercased and sorted so the server reconstructs the same bytes.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// HTTP method of every signed request.
pub const CANONICAL_METHOD: &str = "POST";

/// Path of every signed request.
pub const CANONICAL_URI: &str = "/";

/// The components of a canonical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub uri: String,
    /// Query string (empty for the Hunyuan API).
    pub query_string: String,
    /// Sorted `name:value` lines joined by `\n`, without a trailing newline.
    pub canonical_headers: String,
    /// Sorted lowercase header names joined by `;`.
    pub signed_headers: String,
    /// Lowercase hex SHA-256 of the payload.
    pub payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request of a `POST /` call that signs every given header.
    ///
    /// # Examples
    ///
    /// ```
    /// use hunyuan_auth::canonical::CanonicalRequest;
    ///
    /// let canonical = CanonicalRequest::new(
    ///     &[("Host", "h"), ("Content-Type", "application/json")],
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    /// );
    /// assert_eq!(canonical.signed_headers, "content-type;host");
    /// ```
    #[must_use]
    pub fn new(headers: &[(&str, &str)], payload_hash: &str) -> Self {
        let names: Vec<String> = headers.iter().map(|(name, _)| name.to_lowercase()).collect();
        let signed: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::with_signed_headers(
            CANONICAL_METHOD,
            CANONICAL_URI,
            "",
            headers,
            &signed,
            payload_hash,
        )
    }

    /// Build a canonical request that only covers `signed_headers`.
    #[must_use]
    pub fn with_signed_headers(
        method: &str,
        uri: &str,
        query_string: &str,
        headers: &[(&str, &str)],
        signed_headers: &[&str],
        payload_hash: &str,
    ) -> Self {
        Self {
            method: method.to_owned(),
            uri: if uri.is_empty() {
                CANONICAL_URI.to_owned()
            } else {
                uri.to_owned()
            },
            query_string: query_string.to_owned(),
            canonical_headers: build_canonical_headers(headers, signed_headers),
            signed_headers: build_signed_headers_string(signed_headers),
            payload_hash: payload_hash.to_owned(),
        }
    }

    /// Lowercase hex SHA-256 of the canonical request string.
    #[must_use]
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.to_string().as_bytes()))
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}\n\n{}\n{}",
            self.method,
            self.uri,
            self.query_string,
            self.canonical_headers,
            self.signed_headers,
            self.payload_hash
        )
    }
}

/// Build the canonical headers string from the request headers.
///
/// Only headers listed in `signed_headers` are included. Header names are
/// lowercased, values are trimmed of leading and trailing whitespace, and the
/// lines are sorted by name. Duplicate names have their values joined by commas.
///
/// The result does NOT include a trailing newline; the canonical request
/// format adds the blank line after the header block.
///
/// # Examples
///
/// ```
/// use hunyuan_auth::canonical::build_canonical_headers;
///
/// let result = build_canonical_headers(
///     &[("Host", "h"), ("Content-Type", "application/json")],
///     &["host", "content-type"],
/// );
/// assert_eq!(result, "content-type:application/json\nhost:h");
/// ```
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)], signed_headers: &[&str]) -> String {
    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let trimmed_value = value.trim();
        header_map
            .entry(name.to_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(trimmed_value);
            })
            .or_insert_with(|| trimmed_value.to_owned());
    }

    sorted_lowercase(signed_headers)
        .iter()
        .filter_map(|name| header_map.get(name).map(|value| format!("{name}:{value}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the signed headers string as a semicolon-separated list of lowercase
/// header names, sorted lexicographically.
///
/// # Examples
///
/// ```
/// use hunyuan_auth::canonical::build_signed_headers_string;
///
/// assert_eq!(
///     build_signed_headers_string(&["X-TC-Action", "host", "content-type"]),
///     "content-type;host;x-tc-action"
/// );
/// ```
#[must_use]
pub fn build_signed_headers_string(signed_headers: &[&str]) -> String {
    sorted_lowercase(signed_headers).join(";")
}

fn sorted_lowercase(names: &[&str]) -> Vec<String> {
    let mut sorted: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
