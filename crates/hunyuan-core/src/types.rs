//! Endpoint type definitions shared by the signer and the client.

use std::fmt;

/// Tencent Cloud region identifier, sent as `X-TC-Region`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region(String);

impl Region {
    /// Default region of the Hunyuan 3D service.
    pub const DEFAULT: &str = "ap-guangzhou";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything about the remote API that ends up in signed headers or the
/// credential scope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    /// Value of the signed `Host` header.
    pub host: String,
    /// Service name used in the credential scope (`date/service/tc3_request`).
    pub service: String,
    /// API version, sent as `X-TC-Version`.
    pub version: String,
    /// Target region, sent as `X-TC-Region`.
    pub region: Region,
}

impl ApiEndpoint {
    /// Default host of the Hunyuan 3D API.
    pub const DEFAULT_HOST: &str = "ai3d.tencentcloudapi.com";
    /// Default service name.
    pub const DEFAULT_SERVICE: &str = "ai3d";
    /// Default API version.
    pub const DEFAULT_VERSION: &str = "2025-05-13";
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_owned(),
            service: Self::DEFAULT_SERVICE.to_owned(),
            version: Self::DEFAULT_VERSION.to_owned(),
            region: Region::default(),
        }
    }
}
