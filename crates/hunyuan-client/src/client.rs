//! The Hunyuan 3D API client.
//!
//! Every call captures the current Unix time once, signs the action and its
//! JSON parameters with [`RequestBuilder`], hands the [`SignedRequest`] to a
//! [`Transport`] and unwraps the `{"Response": {...}}` envelope.

use chrono::Utc;
use hunyuan_auth::{Credentials, RequestBuilder, SignedRequest};
use hunyuan_core::HunyuanConfig;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::generate::GenerateRequest;
use crate::job::{JobHandle, JobKind, QueryResponse};
use crate::poller::{Delay, JobPoller, PollOutcome, PollPolicy};
use crate::transport::{HttpTransport, Transport};

/// Client for the Hunyuan 3D job API.
#[derive(Debug)]
pub struct HunyuanClient<T = HttpTransport> {
    builder: RequestBuilder,
    transport: T,
}

impl HunyuanClient<HttpTransport> {
    /// Build a client that talks HTTPS to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Signing`] for unusable credentials and
    /// [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &HunyuanConfig) -> ClientResult<Self> {
        let credentials = Credentials::new(
            config.secret_id.clone(),
            config.secret_key.as_bytes().to_vec(),
        )?;
        let transport = HttpTransport::new(config.endpoint_url(), config.request_timeout())?;
        Ok(Self::new(
            RequestBuilder::new(credentials, config.endpoint.clone()),
            transport,
        ))
    }
}

impl<T: Transport> HunyuanClient<T> {
    /// Create a client from a request builder and a transport.
    pub fn new(builder: RequestBuilder, transport: T) -> Self {
        Self { builder, transport }
    }

    /// The request builder used for signing.
    #[must_use]
    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sign `params` for `action` at the current time.
    pub fn sign<P>(&self, action: &str, params: &P) -> ClientResult<SignedRequest>
    where
        P: Serialize + ?Sized,
    {
        let timestamp = Utc::now().timestamp();
        Ok(self
            .builder
            .build_signed_request(action, params, timestamp)?)
    }

    /// Perform one signed call and return the contents of `Response`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Signing`] if the request cannot be signed; nothing is sent.
    /// - [`ClientError::Transport`] / [`ClientError::HttpStatus`] for HTTP failures.
    /// - [`ClientError::Api`] if the response carries `Response.Error`.
    /// - [`ClientError::Protocol`] if the body has no `Response` object.
    pub async fn call<P>(&self, action: &str, params: &P) -> ClientResult<Map<String, Value>>
    where
        P: Serialize + Sync + ?Sized,
    {
        let request = self.sign(action, params)?;
        let body = self.transport.send(&request).await?;
        let response = unwrap_envelope(body)?;
        debug!(action, "Call succeeded");
        Ok(response)
    }

    /// Submit a job of the given kind with already shaped parameters.
    pub async fn submit<P>(&self, kind: JobKind, params: &P) -> ClientResult<JobHandle>
    where
        P: Serialize + Sync + ?Sized,
    {
        let response = self.call(kind.submit_action(), params).await?;

        let job_id = job_id_of(&response)
            .ok_or_else(|| ClientError::Protocol("submit response has no JobId".to_owned()))?;
        let request_id = request_id_of(&response);

        info!(%kind, job_id, request_id = ?request_id, "Submitted job");

        Ok(JobHandle {
            job_id: job_id.to_owned(),
            kind,
            request_id,
        })
    }

    /// Validate, shape and submit a [`GenerateRequest`].
    pub async fn submit_request(
        &self,
        kind: JobKind,
        request: &GenerateRequest,
    ) -> ClientResult<JobHandle> {
        let params = request.to_params(kind)?;
        self.submit(kind, &params).await
    }

    /// Query the current status of a job.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] if the response has no `Status`, in
    /// addition to the errors of [`Self::call`].
    pub async fn query(&self, handle: &JobHandle) -> ClientResult<QueryResponse> {
        let response = self
            .call(handle.kind.query_action(), &json!({"JobId": handle.job_id}))
            .await?;
        serde_json::from_value(Value::Object(response))
            .map_err(|e| ClientError::Protocol(format!("malformed query response: {e}")))
    }

    /// Submit a job and poll it until it reaches a terminal status or the
    /// attempt budget runs out.
    pub async fn submit_and_wait<P, D>(
        &self,
        kind: JobKind,
        params: &P,
        policy: PollPolicy,
        delay: D,
    ) -> ClientResult<(JobHandle, PollOutcome)>
    where
        P: Serialize + Sync + ?Sized,
        D: Delay,
    {
        let handle = self.submit(kind, params).await?;
        let outcome = JobPoller::new(policy, delay).poll(self, &handle).await?;
        Ok((handle, outcome))
    }
}

fn unwrap_envelope(body: Value) -> ClientResult<Map<String, Value>> {
    let Value::Object(mut root) = body else {
        return Err(ClientError::Protocol("response is not a JSON object".to_owned()));
    };
    let Some(Value::Object(response)) = root.remove("Response") else {
        return Err(ClientError::Protocol(
            "response has no Response envelope".to_owned(),
        ));
    };

    if let Some(error) = response.get("Error") {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        return Err(ClientError::Api {
            code: field("Code"),
            message: field("Message"),
            request_id: request_id_of(&response),
        });
    }

    Ok(response)
}

/// `JobId`, then `TaskId`, then `Data.JobId`, then `Result.JobId`.
fn job_id_of(response: &Map<String, Value>) -> Option<&str> {
    response
        .get("JobId")
        .or_else(|| response.get("TaskId"))
        .or_else(|| response.get("Data").and_then(|d| d.get("JobId")))
        .or_else(|| response.get("Result").and_then(|r| r.get("JobId")))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn request_id_of(response: &Map<String, Value>) -> Option<String> {
    response
        .get("RequestId")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
