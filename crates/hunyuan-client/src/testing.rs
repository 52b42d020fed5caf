//! Scripted transport and recording delay shared by the unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use hunyuan_auth::{Credentials, RequestBuilder, SignedRequest};
use hunyuan_core::ApiEndpoint;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::client::HunyuanClient;
use crate::error::{ClientError, ClientResult};
use crate::poller::Delay;
use crate::transport::Transport;

/// Replays scripted responses in order and records every request it sees.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<ClientResult<Value>>>,
    requests: Mutex<Vec<SignedRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: impl IntoIterator<Item = ClientResult<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.header("X-TC-Action").unwrap_or_default().to_owned())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &SignedRequest) -> ClientResult<Value> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Protocol("script exhausted".to_owned())))
    }
}

/// A delay that returns immediately and records every requested wait.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().push(duration);
    }
}

pub(crate) fn status_response(status: &str) -> ClientResult<Value> {
    Ok(json!({"Response": {"Status": status, "RequestId": "req-query"}}))
}

pub(crate) fn test_client(
    responses: impl IntoIterator<Item = ClientResult<Value>>,
) -> HunyuanClient<ScriptedTransport> {
    let credentials = Credentials::new("AKIDEXAMPLE", "test_key").unwrap();
    HunyuanClient::new(
        RequestBuilder::new(credentials, ApiEndpoint::default()),
        ScriptedTransport::new(responses),
    )
}
