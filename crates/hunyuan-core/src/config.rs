//! Configuration management for the Hunyuan 3D client.
//!
//! All configuration is driven by environment variables and loaded once at
//! process start. The resulting [`HunyuanConfig`] is immutable and passed
//! explicitly into the signer and client.

use std::fmt;
use std::time::Duration;

use crate::error::{HunyuanError, HunyuanResult};
use crate::types::{ApiEndpoint, Region};

/// Global configuration for the Hunyuan 3D client.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunyuanConfig {
    /// Credential id (`TENCENTCLOUD_SECRET_ID`).
    pub secret_id: String,
    /// Credential secret (`TENCENTCLOUD_SECRET_KEY`).
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    /// Host, service, version and region of the remote API.
    pub endpoint: ApiEndpoint,
    /// URL requests are POSTed to. Defaults to `https://{host}/`.
    pub endpoint_url: Option<String>,
    /// Delay before each status query.
    pub poll_interval_secs: u64,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
    /// Log level.
    pub log_level: String,
}

impl Default for HunyuanConfig {
    fn default() -> Self {
        Self {
            secret_id: String::new(),
            secret_key: String::new(),
            endpoint: ApiEndpoint::default(),
            endpoint_url: None,
            poll_interval_secs: 3,
            request_timeout_secs: 60,
            log_level: "info".to_owned(),
        }
    }
}

impl fmt::Debug for HunyuanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HunyuanConfig")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("endpoint_url", &self.endpoint_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl HunyuanConfig {
    /// Load configuration from environment variables.
    ///
    /// `TENCENTCLOUD_SECRET_ID` and `TENCENTCLOUD_SECRET_KEY` are required.
    pub fn from_env() -> HunyuanResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> HunyuanResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            secret_id: lookup("TENCENTCLOUD_SECRET_ID")
                .ok_or(HunyuanError::MissingEnv("TENCENTCLOUD_SECRET_ID"))?,
            secret_key: lookup("TENCENTCLOUD_SECRET_KEY")
                .ok_or(HunyuanError::MissingEnv("TENCENTCLOUD_SECRET_KEY"))?,
            ..Self::default()
        };

        if let Some(v) = lookup("HUNYUAN_HOST") {
            config.endpoint.host = v;
        }
        if let Some(v) = lookup("HUNYUAN_ENDPOINT_URL") {
            config.endpoint_url = Some(v);
        }
        if let Some(v) = lookup("HUNYUAN_REGION") {
            config.endpoint.region = Region::new(v);
        }
        if let Some(v) = lookup("HUNYUAN_API_VERSION") {
            config.endpoint.version = v;
        }
        if let Some(v) = lookup("HUNYUAN_SERVICE") {
            config.endpoint.service = v;
        }
        if let Some(v) = lookup("HUNYUAN_POLL_INTERVAL_SECS") {
            config.poll_interval_secs = parse_secs("HUNYUAN_POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("HUNYUAN_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_secs("HUNYUAN_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }

    /// URL the signed requests are sent to.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.endpoint.host))
    }

    /// Delay before each status query.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// HTTP request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_secs(name: &str, value: &str) -> HunyuanResult<u64> {
    value.trim().parse().map_err(|_| {
        HunyuanError::Config(format!(
            "{name} must be a whole number of seconds, got {value:?}"
        ))
    })
}
