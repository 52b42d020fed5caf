//! End-to-end tests for the Hunyuan 3D client.
//!
//! Each test starts an in-process HTTP/1 server on `127.0.0.1:0` that plays
//! the Hunyuan 3D API: it verifies the TC3 signature of every request with
//! [`verify_tc3`], records the call, and answers from a script. The client
//! under test is the production [`HunyuanClient`] over [`HttpTransport`],
//! pointed at the server through `HUNYUAN_ENDPOINT_URL` style configuration.
//! `GET` requests are answered from a table of result files, standing in for
//! the CDN that hosts finished models.
//!
//! Run them with:
//! ```text
//! cargo test -p hunyuan-integration
//! ```

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hunyuan_auth::{Credentials, StaticCredentialProvider, verify_tc3};
use hunyuan_client::{HttpTransport, HunyuanClient};
use hunyuan_core::HunyuanConfig;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{debug, warn};

/// Credential id accepted by the fake API.
pub const SECRET_ID: &str = "AKIDINTEGRATION";

/// Credential secret accepted by the fake API.
pub const SECRET_KEY: &str = "integration-secret";

/// Job id handed out by every submission.
pub const JOB_ID: &str = "job-123";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Scripted answer to one query call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"Response": {"Status": ..}}`.
    Status(&'static str),
    /// A finished job with one OBJ result file.
    Finished(&'static str),
    /// A failed job with an error message.
    Failed(&'static str),
    /// A raw HTTP answer that is not an API envelope.
    Raw(StatusCode, &'static str),
    /// Arbitrary contents of `Response`.
    Json(Value),
}

/// A request as the fake API saw it.
#[derive(Debug, Clone)]
pub struct ReceivedCall {
    /// `X-TC-Action`.
    pub action: String,
    /// Parsed JSON body.
    pub body: Value,
    /// Whether the TC3 signature verified.
    pub verified: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    replies: VecDeque<Reply>,
    calls: Vec<ReceivedCall>,
    files: HashMap<String, Bytes>,
}

/// Handle to a running fake API.
#[derive(Debug, Clone)]
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    /// Start a fake API that answers queries with `replies`, in order.
    pub async fn start(replies: impl IntoIterator<Item = Reply>) -> Result<Self> {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind fake API listener")?;
        let addr = listener.local_addr()?;

        let state = Arc::new(Mutex::new(FakeState {
            replies: replies.into_iter().collect(),
            ..FakeState::default()
        }));
        let provider = Arc::new(StaticCredentialProvider::new([Credentials::new(
            SECRET_ID, SECRET_KEY,
        )?]));

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let (stream, peer_addr) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let state = Arc::clone(&server_state);
                let provider = Arc::clone(&provider);
                let svc = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    let provider = Arc::clone(&provider);
                    async move { Ok::<_, Infallible>(handle(req, &state, &provider).await) }
                });

                tokio::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        debug!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }
        });

        Ok(Self { addr, state })
    }

    /// Configuration pointing at this server, signed with `secret_key`.
    #[must_use]
    pub fn config(&self, secret_key: &str) -> HunyuanConfig {
        config_for(self.addr, secret_key)
    }

    /// Queue one more answer for query calls.
    pub fn push_reply(&self, reply: Reply) {
        self.state.lock().replies.push_back(reply);
    }

    /// Serve `contents` for `GET {path}` and return its URL.
    pub fn serve_file(&self, path: &str, contents: impl Into<Bytes>) -> String {
        self.state
            .lock()
            .files
            .insert(path.to_owned(), contents.into());
        self.url(path)
    }

    /// Absolute URL of `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A production client pointing at this server with valid credentials.
    pub fn client(&self) -> Result<HunyuanClient<HttpTransport>> {
        Ok(HunyuanClient::from_config(&self.config(SECRET_KEY))?)
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.state.lock().calls.clone()
    }

    /// The actions received so far.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.action).collect()
    }
}

/// Configuration pointing at `addr`, signed with `secret_key`.
#[must_use]
pub fn config_for(addr: SocketAddr, secret_key: &str) -> HunyuanConfig {
    HunyuanConfig {
        secret_id: SECRET_ID.to_owned(),
        secret_key: secret_key.to_owned(),
        endpoint_url: Some(format!("http://{addr}/")),
        poll_interval_secs: 0,
        request_timeout_secs: 5,
        ..HunyuanConfig::default()
    }
}

/// A loopback address nothing listens on.
pub async fn closed_addr() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to reserve a loopback port")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Build a zip archive from `(name, contents)` pairs.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(contents)?;
    }
    Ok(writer.finish()?.into_inner())
}

async fn handle(
    req: Request<Incoming>,
    state: &Mutex<FakeState>,
    provider: &StaticCredentialProvider,
) -> Response<Full<Bytes>> {
    if req.method() == http::Method::GET {
        let file = state.lock().files.get(req.uri().path()).cloned();
        return match file {
            Some(contents) => Response::new(Full::new(contents)),
            None => raw(StatusCode::NOT_FOUND, "no such file"),
        };
    }

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return raw(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let verification = verify_tc3(&parts, &body, provider);
    let action = parts
        .headers
        .get("x-tc-action")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let mut state = state.lock();
    state.calls.push(ReceivedCall {
        action: action.clone(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        verified: verification.is_ok(),
    });

    if let Err(e) = verification {
        return envelope(json!({
            "Error": {"Code": "AuthFailure.SignatureFailure", "Message": e.to_string()},
            "RequestId": "req-auth"
        }));
    }

    if action.starts_with("Submit") {
        return envelope(json!({"JobId": JOB_ID, "RequestId": "req-submit"}));
    }
    if !action.starts_with("Query") {
        return envelope(json!({
            "Error": {"Code": "InvalidAction", "Message": format!("unknown action {action}")},
            "RequestId": "req-action"
        }));
    }

    match state.replies.pop_front() {
        Some(Reply::Status(status)) => envelope(json!({"Status": status, "RequestId": "req-q"})),
        Some(Reply::Finished(status)) => envelope(json!({
            "Status": status,
            "ResultFile3Ds": [{
                "Type": "OBJ",
                "Url": "https://cdn.example/job-123/model.zip",
                "PreviewImageUrl": "https://cdn.example/job-123/preview.png"
            }],
            "RequestId": "req-q"
        })),
        Some(Reply::Failed(message)) => envelope(json!({
            "Status": "FAIL",
            "ErrorCode": "ResourceUnavailable",
            "ErrorMessage": message,
            "RequestId": "req-q"
        })),
        Some(Reply::Raw(status, body)) => raw(status, body),
        Some(Reply::Json(response)) => envelope(response),
        None => envelope(json!({
            "Error": {"Code": "ResourceNotFound", "Message": "no scripted reply"},
            "RequestId": "req-none"
        })),
    }
}

fn envelope(response: Value) -> Response<Full<Bytes>> {
    let body = json!({"Response": response}).to_string();
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    resp.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    resp
}

fn raw(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body.to_owned())));
    *resp.status_mut() = status;
    resp
}

mod test_auth;
mod test_download;
mod test_job;
