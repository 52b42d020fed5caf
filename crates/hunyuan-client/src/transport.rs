//! The transport seam between signing and the network.
//!
//! A [`Transport`] takes a [`SignedRequest`] and returns the parsed JSON body.
//! It must send the body bytes and headers exactly as signed. The production
//! implementation is [`HttpTransport`]; tests substitute scripted fakes.

use std::time::Duration;

use async_trait::async_trait;
use hunyuan_auth::SignedRequest;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Sends a signed request and returns the decoded JSON response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and decode the response body as JSON.
    async fn send(&self, request: &SignedRequest) -> ClientResult<serde_json::Value>;
}

/// [`Transport`] over HTTPS using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport that POSTs to `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The URL requests are sent to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &SignedRequest) -> ClientResult<serde_json::Value> {
        let headers = request.header_map()?;

        debug!(
            url = %self.url,
            action = request.header("X-TC-Action").unwrap_or_default(),
            "Sending signed request"
        );

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => {
                if !status.is_success() {
                    warn!(status = status.as_u16(), "Non-success status with JSON body");
                }
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(ClientError::Protocol(format!(
                "response body is not JSON: {e}"
            ))),
        }
    }
}
