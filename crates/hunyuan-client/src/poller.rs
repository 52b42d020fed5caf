//! Fixed-delay job polling.
//!
//! A job moves `Submitted -> Polling -> {Terminal, Exhausted}`. Before each
//! status query the poller waits one interval through its [`Delay`]. The first
//! terminal status ends the loop. A query that fails with a transport, API or
//! protocol error still uses up an attempt; a signing failure aborts at once.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::HunyuanClient;
use crate::error::{ClientError, ClientResult};
use crate::job::{JobHandle, JobKind, JobStatus, QueryResponse};
use crate::transport::Transport;

/// Waits between status queries.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspend the caller for `duration`.
    async fn wait(&self, duration: Duration);
}

#[async_trait]
impl<D: Delay + ?Sized> Delay for &D {
    async fn wait(&self, duration: Duration) {
        (**self).wait(duration).await;
    }
}

/// [`Delay`] backed by `tokio::time::sleep`.
///
/// ```
/// use std::time::Duration;
///
/// use hunyuan_client::{Delay, TokioDelay};
///
/// # tokio_test::block_on(async {
/// TokioDelay.wait(Duration::from_millis(1)).await;
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to query and how long to wait before each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status queries. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before each query.
    pub interval: Duration,
}

impl PollPolicy {
    /// Default delay before each query.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

    /// Default policy for a job kind.
    #[must_use]
    pub fn for_kind(kind: JobKind) -> Self {
        Self {
            max_attempts: kind.default_max_attempts(),
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Override the attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the delay between queries.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::for_kind(JobKind::Standard)
    }
}

/// How polling ended.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job reached a terminal status, successful or not.
    Terminal {
        /// The terminal status.
        status: JobStatus,
        /// The query response carrying that status.
        response: QueryResponse,
        /// Number of queries made.
        attempts: u32,
    },
    /// The attempt budget ran out before a terminal status was seen.
    Exhausted {
        /// Number of queries made.
        attempts: u32,
        /// Raw status of the last successful query, if any.
        last_status: Option<String>,
        /// Error of the last failed query, if any.
        last_error: Option<ClientError>,
    },
}

impl PollOutcome {
    /// Number of queries made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Terminal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Whether the job finished with a non-failure terminal status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Terminal { status, .. } if status.is_success())
    }

    /// The terminal query response, if polling reached one.
    #[must_use]
    pub fn response(&self) -> Option<&QueryResponse> {
        match self {
            Self::Terminal { response, .. } => Some(response),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Queries a job until it is terminal or the policy's budget is spent.
#[derive(Debug, Clone)]
pub struct JobPoller<D = TokioDelay> {
    policy: PollPolicy,
    delay: D,
}

impl<D: Delay> JobPoller<D> {
    /// Create a poller.
    pub fn new(policy: PollPolicy, delay: D) -> Self {
        Self { policy, delay }
    }

    /// The poll policy.
    #[must_use]
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Poll `handle` through `client`.
    ///
    /// # Errors
    ///
    /// Only [`ClientError::Signing`] is returned as an error. Every other
    /// failure is counted as an attempt and surfaces as the `last_error` of
    /// [`PollOutcome::Exhausted`] if the budget runs out.
    pub async fn poll<T: Transport>(
        &self,
        client: &HunyuanClient<T>,
        handle: &JobHandle,
    ) -> ClientResult<PollOutcome> {
        let budget = self.policy.attempt_budget();
        let mut last_status = None;
        let mut last_error = None;

        for attempt in 1..=budget {
            self.delay.wait(self.policy.interval).await;

            match client.query(handle).await {
                Ok(response) => {
                    let status = response.job_status();
                    debug!(
                        job_id = %handle.job_id,
                        attempt,
                        status = %response.status,
                        "Polled job status"
                    );
                    if status.is_terminal() {
                        info!(job_id = %handle.job_id, %status, attempts = attempt, "Job finished");
                        return Ok(PollOutcome::Terminal {
                            status,
                            response,
                            attempts: attempt,
                        });
                    }
                    last_status = Some(response.status);
                }
                Err(e) if e.is_signing() => return Err(e),
                Err(e) => {
                    warn!(job_id = %handle.job_id, attempt, error = %e, "Status query failed");
                    last_error = Some(e);
                }
            }
        }

        warn!(
            job_id = %handle.job_id,
            attempts = budget,
            last_status = ?last_status,
            "Gave up polling job"
        );
        Ok(PollOutcome::Exhausted {
            attempts: budget,
            last_status,
            last_error,
        })
    }
}
