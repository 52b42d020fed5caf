//! Job kinds, handles, statuses and query responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// The three Hunyuan 3D job flavors, each with its own submit/query actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// `SubmitHunyuanTo3DJob` / `QueryHunyuanTo3DJob`.
    #[default]
    Standard,
    /// `SubmitHunyuanTo3DProJob` / `QueryHunyuanTo3DProJob`.
    #[serde(rename = "pro")]
    Professional,
    /// `SubmitHunyuanTo3DRapidJob` / `QueryHunyuanTo3DRapidJob`.
    Rapid,
}

impl JobKind {
    /// All job kinds.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Professional, Self::Rapid];

    /// API action that submits a job of this kind.
    #[must_use]
    pub fn submit_action(self) -> &'static str {
        match self {
            Self::Standard => "SubmitHunyuanTo3DJob",
            Self::Professional => "SubmitHunyuanTo3DProJob",
            Self::Rapid => "SubmitHunyuanTo3DRapidJob",
        }
    }

    /// API action that queries a job of this kind.
    #[must_use]
    pub fn query_action(self) -> &'static str {
        match self {
            Self::Standard => "QueryHunyuanTo3DJob",
            Self::Professional => "QueryHunyuanTo3DProJob",
            Self::Rapid => "QueryHunyuanTo3DRapidJob",
        }
    }

    /// Default number of status queries before giving up.
    #[must_use]
    pub fn default_max_attempts(self) -> u32 {
        match self {
            Self::Standard => 5,
            Self::Professional | Self::Rapid => 3,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Professional => "pro",
            Self::Rapid => "rapid",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "std" => Ok(Self::Standard),
            "pro" | "professional" => Ok(Self::Professional),
            "rapid" => Ok(Self::Rapid),
            other => Err(ClientError::InvalidRequest(format!(
                "unknown job kind {other:?} (expected standard, pro or rapid)"
            ))),
        }
    }
}

/// A submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    /// Opaque job id returned by the submit call.
    pub job_id: String,
    /// Kind of the job; selects the query action.
    pub kind: JobKind,
    /// Request id of the submit call, if the API returned one.
    pub request_id: Option<String>,
}

impl JobHandle {
    /// Create a handle for an existing job id.
    pub fn new(job_id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            job_id: job_id.into(),
            kind,
            request_id: None,
        }
    }
}

/// Status of a job as reported by the latest query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Queued or running.
    Pending,
    /// Finished.
    Done,
    /// Finished.
    Success,
    /// Finished.
    Completed,
    /// Finished unsuccessfully.
    Failed,
    /// Finished unsuccessfully.
    Error,
    /// Any status string not recognized above.
    Unknown,
}

impl JobStatus {
    /// Parse a status string, ignoring ASCII case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use hunyuan_client::JobStatus;
    ///
    /// assert_eq!(JobStatus::parse("DONE"), JobStatus::Done);
    /// assert_eq!(JobStatus::parse("wait"), JobStatus::Pending);
    /// assert_eq!(JobStatus::parse("whatever"), JobStatus::Unknown);
    /// ```
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" | "wait" | "run" | "running" | "processing" => Self::Pending,
            "done" | "finish" | "finished" => Self::Done,
            "success" | "succ" => Self::Success,
            "completed" => Self::Completed,
            "failed" | "fail" => Self::Failed,
            "error" | "timeout" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Whether polling should stop at this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::Success | Self::Completed | Self::Failed | Self::Error
        )
    }

    /// Whether this is a terminal failure reported by the remote service.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }

    /// Whether the job finished and its results can be fetched.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Done | Self::Success | Self::Completed)
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Success => "success",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated file listed in a query response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultFile {
    /// File type, e.g. `OBJ` or `GLB`.
    #[serde(rename = "Type", default)]
    pub file_type: String,
    /// Download URL.
    pub url: String,
    /// Preview image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

/// The `Response` body of a query call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResponse {
    /// Raw status string as sent by the API.
    pub status: String,
    /// Job-level error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Job-level error message.
    #[serde(default, alias = "ErrorMsg", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Generated files, once the job has finished.
    #[serde(rename = "ResultFile3Ds", default, skip_serializing_if = "Option::is_none")]
    pub result_files: Option<Vec<ResultFile>>,
    /// Request id of the query call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl QueryResponse {
    /// Parsed status.
    #[must_use]
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }

    /// Generated files, empty while the job is running.
    #[must_use]
    pub fn result_files(&self) -> &[ResultFile] {
        self.result_files.as_deref().unwrap_or_default()
    }
}
