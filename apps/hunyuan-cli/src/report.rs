//! JSON job report printed on stdout.

use hunyuan_client::{
    DownloadedFiles, JobHandle, JobKind, PollOutcome, QueryResponse, ResultFile,
};
use serde::Serialize;

/// Where the job stands when the command finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportState {
    /// Submitted without waiting.
    Submitted,
    /// Still running.
    Pending,
    /// Finished successfully.
    Succeeded,
    /// Finished with a failure status.
    Failed,
    /// Gave up before a terminal status.
    Exhausted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: String,
    pub kind: JobKind,
    pub state: ReportState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ResultFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadedFiles>,
}

impl JobReport {
    fn new(handle: &JobHandle, state: ReportState) -> Self {
        Self {
            job_id: handle.job_id.clone(),
            kind: handle.kind,
            state,
            status: None,
            attempts: None,
            error_code: None,
            error: None,
            files: Vec::new(),
            request_id: handle.request_id.clone(),
            download: None,
        }
    }

    pub fn submitted(handle: &JobHandle) -> Self {
        Self::new(handle, ReportState::Submitted)
    }

    pub fn from_query(handle: &JobHandle, response: &QueryResponse) -> Self {
        let status = response.job_status();
        let state = if !status.is_terminal() {
            ReportState::Pending
        } else if status.is_failure() {
            ReportState::Failed
        } else {
            ReportState::Succeeded
        };

        Self {
            status: Some(response.status.clone()),
            error_code: response.error_code.clone().filter(|c| !c.is_empty()),
            error: response.error_message.clone().filter(|m| !m.is_empty()),
            files: response.result_files().to_vec(),
            request_id: response.request_id.clone(),
            ..Self::new(handle, state)
        }
    }

    pub fn from_outcome(handle: &JobHandle, outcome: &PollOutcome) -> Self {
        match outcome {
            PollOutcome::Terminal {
                response, attempts, ..
            } => Self {
                attempts: Some(*attempts),
                ..Self::from_query(handle, response)
            },
            PollOutcome::Exhausted {
                attempts,
                last_status,
                last_error,
            } => Self {
                status: last_status.clone(),
                attempts: Some(*attempts),
                error: last_error.as_ref().map(ToString::to_string),
                ..Self::new(handle, ReportState::Exhausted)
            },
        }
    }

    #[must_use]
    pub fn with_download(self, download: DownloadedFiles) -> Self {
        Self {
            download: Some(download),
            ..self
        }
    }
}

/// 0 for a successful or merely submitted/pending job, 1 otherwise.
pub fn exit_status(report: &JobReport) -> u8 {
    match report.state {
        ReportState::Submitted | ReportState::Pending | ReportState::Succeeded => 0,
        ReportState::Failed | ReportState::Exhausted => 1,
    }
}
