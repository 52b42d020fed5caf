//! TC3-HMAC-SHA256 request signing for the Hunyuan 3D API.
//!
//! This crate implements the signing side of Tencent Cloud's TC3 scheme: a
//! canonical request is built from the outgoing headers and the payload hash,
//! hashed into a string to sign, and signed with a key derived through a fixed
//! HMAC-SHA256 chain scoped to the request date and service. The inverse
//! operation, verification of an incoming signed request, is also provided.
//!
//! # Usage
//!
//! ```rust
//! use hunyuan_auth::{Credentials, RequestBuilder};
//! use hunyuan_core::ApiEndpoint;
//!
//! let credentials = Credentials::new("AKIDEXAMPLE", "secret").unwrap();
//! let builder = RequestBuilder::new(credentials, ApiEndpoint::default());
//!
//! let signed = builder
//!     .build_signed_request("QueryHunyuanTo3DJob", &serde_json::json!({"JobId": "1"}), 1_609_459_200)
//!     .unwrap();
//! assert!(signed.authorization.starts_with("TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2021-01-01/ai3d/tc3_request"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`credentials`] - Credentials and the credential provider trait
//! - [`error`] - Authentication error types
//! - [`request`] - Signed request assembly
//! - [`tc3`] - Signing key derivation and signature computation
//! - [`verify`] - Verification of signed requests

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod request;
pub mod tc3;
pub mod verify;

pub use canonical::CanonicalRequest;
pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use request::{RequestBuilder, SignedRequest};
pub use tc3::{SigningContext, hash_payload, sign};
pub use verify::{VerifiedRequest, verify_tc3};
