//! Hunyuan 3D job submission and polling.
//!
//! This crate sends TC3-signed calls to the Hunyuan 3D API and follows the
//! asynchronous job lifecycle: a submit call returns a job id, and the
//! [`JobPoller`] queries the job at a fixed interval until it reaches a
//! terminal status or the attempt budget runs out.
//!
//! # Modules
//!
//! - [`client`] - [`HunyuanClient`]: signed calls, submit and query
//! - [`download`] - Result file download and archive extraction
//! - [`error`] - Client error taxonomy
//! - [`generate`] - Per-job-kind request body shaping
//! - [`image`] - Image input normalization (local files, data URLs, base64)
//! - [`job`] - Job kinds, handles, statuses and query responses
//! - [`poller`] - Fixed-delay poll loop with an injectable [`Delay`]
//! - [`transport`] - The [`Transport`] seam and the reqwest-backed [`HttpTransport`]

pub mod client;
pub mod download;
pub mod error;
pub mod generate;
pub mod image;
pub mod job;
pub mod poller;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::HunyuanClient;
pub use download::{DownloadedFiles, Downloader};
pub use error::{ClientError, ClientResult};
pub use generate::{GenerateRequest, GenerateType, PolygonType, ViewImage};
pub use image::{ImageInput, ImageSource};
pub use job::{JobHandle, JobKind, JobStatus, QueryResponse, ResultFile};
pub use poller::{Delay, JobPoller, PollOutcome, PollPolicy, TokioDelay};
pub use transport::{HttpTransport, Transport};
