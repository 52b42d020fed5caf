//! Hunyuan 3D CLI - submit text/image-to-3D jobs and follow them to completion.
//!
//! # Usage
//!
//! ```text
//! hunyuan-3d submit --kind pro --prompt "a cute cat"
//! hunyuan-3d submit --kind rapid --image-url https://example.com/cat.png --result-format glb
//! hunyuan-3d submit --kind pro --image-path ./cat.png --download-dir ./models
//! hunyuan-3d query --kind pro --job-id 1357924680 --download-dir ./models
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TENCENTCLOUD_SECRET_ID` | *(required)* | Credential id |
//! | `TENCENTCLOUD_SECRET_KEY` | *(required)* | Credential secret |
//! | `HUNYUAN_HOST` | `ai3d.tencentcloudapi.com` | Signed `Host` header |
//! | `HUNYUAN_ENDPOINT_URL` | `https://{host}/` | URL requests are POSTed to |
//! | `HUNYUAN_REGION` | `ap-guangzhou` | `X-TC-Region` |
//! | `HUNYUAN_API_VERSION` | `2025-05-13` | `X-TC-Version` |
//! | `HUNYUAN_SERVICE` | `ai3d` | Credential scope service |
//! | `HUNYUAN_POLL_INTERVAL_SECS` | `3` | Delay before each status query |
//! | `HUNYUAN_REQUEST_TIMEOUT_SECS` | `60` | HTTP request timeout |
//! | `HUNYUAN_KIND` | `pro` | Default job kind |
//! | `HUNYUAN_MAX_ATTEMPTS` | per kind | Maximum number of status queries |
//! | `HUNYUAN_DOWNLOAD_DIR` | *(unset)* | Download results of finished jobs here |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! The job report is printed to stdout as JSON; logs go to stderr. The exit
//! code is 0 when the job succeeded (or was only submitted), 1 otherwise.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hunyuan_client::{
    ClientResult, Downloader, GenerateRequest, GenerateType, HunyuanClient, ImageSource,
    JobHandle, JobKind, JobPoller, PollPolicy, PolygonType, QueryResponse, TokioDelay,
};
use hunyuan_core::HunyuanConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::report::{JobReport, exit_status};

#[derive(Debug, Parser)]
#[command(name = "hunyuan-3d")]
#[command(about = "Submit and track Hunyuan 3D generation jobs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a generation job and, unless --no-wait is given, poll it
    Submit(SubmitArgs),

    /// Query an existing job
    Query(QueryArgs),
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Job kind: standard, pro or rapid
    #[arg(long, env = "HUNYUAN_KIND", default_value = "pro")]
    kind: JobKind,

    /// Text description of the model
    #[arg(long)]
    prompt: Option<String>,

    /// URL of an input image; data URLs are sent inline
    #[arg(long, conflicts_with_all = ["image_base64", "image_path"])]
    image_url: Option<String>,

    /// Base64 data of an input image
    #[arg(long, conflicts_with = "image_path")]
    image_base64: Option<String>,

    /// Local image file, sent inline as base64
    #[arg(long)]
    image_path: Option<PathBuf>,

    /// Output format for rapid jobs (obj, glb, stl, usdz, fbx)
    #[arg(long)]
    result_format: Option<String>,

    /// Generate PBR materials (`--enable-pbr` alone means true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    enable_pbr: Option<bool>,

    /// Target face count
    #[arg(long)]
    face_count: Option<u32>,

    /// Generation mode: normal, lowpoly, geometry or sketch
    #[arg(long)]
    generate_type: Option<GenerateType>,

    /// Polygon type for lowpoly mode: triangle or quadrilateral
    #[arg(long)]
    polygon_type: Option<PolygonType>,

    /// Return right after submission
    #[arg(long)]
    no_wait: bool,

    #[command(flatten)]
    poll: PollArgs,

    #[command(flatten)]
    download: DownloadArgs,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Job kind: standard, pro or rapid
    #[arg(long, env = "HUNYUAN_KIND", default_value = "pro")]
    kind: JobKind,

    /// Job id returned at submission
    #[arg(long)]
    job_id: String,

    /// Keep polling until the job is terminal or the attempts run out
    #[arg(long)]
    wait: bool,

    #[command(flatten)]
    poll: PollArgs,

    #[command(flatten)]
    download: DownloadArgs,
}

#[derive(Debug, Args)]
struct PollArgs {
    /// Maximum number of status queries (defaults to 5 for standard, 3 otherwise)
    #[arg(long, env = "HUNYUAN_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,
}

#[derive(Debug, Args)]
struct DownloadArgs {
    /// Download result files of a finished job into a new directory here
    #[arg(long, env = "HUNYUAN_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,
}

impl PollArgs {
    fn policy(&self, kind: JobKind, config: &HunyuanConfig) -> PollPolicy {
        let policy = PollPolicy::for_kind(kind).with_interval(config.poll_interval());
        match self.max_attempts {
            Some(max_attempts) => policy.with_max_attempts(max_attempts),
            None => policy,
        }
    }
}

impl SubmitArgs {
    async fn generate_request(&self) -> ClientResult<GenerateRequest> {
        let request = GenerateRequest {
            prompt: self.prompt.clone(),
            image_url: self.image_url.clone(),
            image_base64: self.image_base64.clone(),
            multi_view_images: Vec::new(),
            result_format: self.result_format.clone(),
            enable_pbr: self.enable_pbr,
            face_count: self.face_count,
            generate_type: self.generate_type,
            polygon_type: self.polygon_type,
        }
        .resolve_images()
        .await?;

        match &self.image_path {
            Some(path) => {
                let image = ImageSource::LocalPath(path.clone()).resolve().await?;
                Ok(request.with_image(image))
            }
            None => Ok(request),
        }
    }
}

impl DownloadArgs {
    /// Download the results into the report when asked to and the job succeeded.
    async fn apply(
        &self,
        config: &HunyuanConfig,
        handle: &JobHandle,
        response: Option<&QueryResponse>,
        report: JobReport,
    ) -> Result<JobReport> {
        let Some(base_dir) = &self.download_dir else {
            return Ok(report);
        };
        let Some(response) = response.filter(|r| r.job_status().is_success()) else {
            info!(job_id = %handle.job_id, "Job has not succeeded, nothing to download");
            return Ok(report);
        };

        let downloader =
            Downloader::new(config.request_timeout()).context("failed to build downloader")?;
        let downloaded = downloader
            .download_results(handle, response, base_dir)
            .await
            .with_context(|| format!("failed to download results of job {}", handle.job_id))?;
        Ok(report.with_download(downloaded))
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = HunyuanConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level, cli.log_json)?;

    info!(
        endpoint = %config.endpoint_url(),
        region = %config.endpoint.region,
        version = %config.endpoint.version,
        "Starting Hunyuan 3D client"
    );

    let client = HunyuanClient::from_config(&config).context("failed to build client")?;

    let report = match cli.command {
        Command::Submit(args) => submit(&client, &config, &args).await?,
        Command::Query(args) => query(&client, &config, &args).await?,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to render report")?
    );
    Ok(ExitCode::from(exit_status(&report)))
}

async fn submit(
    client: &HunyuanClient,
    config: &HunyuanConfig,
    args: &SubmitArgs,
) -> Result<JobReport> {
    let request = args
        .generate_request()
        .await
        .context("failed to prepare image input")?;
    let handle = client
        .submit_request(args.kind, &request)
        .await
        .with_context(|| format!("failed to submit {} job", args.kind))?;

    if args.no_wait {
        if args.download.download_dir.is_some() {
            warn!("--download-dir has no effect with --no-wait");
        }
        return Ok(JobReport::submitted(&handle));
    }

    let poller = JobPoller::new(args.poll.policy(args.kind, config), TokioDelay);
    let outcome = poller
        .poll(client, &handle)
        .await
        .with_context(|| format!("failed to poll job {}", handle.job_id))?;
    let report = JobReport::from_outcome(&handle, &outcome);
    args.download
        .apply(config, &handle, outcome.response(), report)
        .await
}

async fn query(
    client: &HunyuanClient,
    config: &HunyuanConfig,
    args: &QueryArgs,
) -> Result<JobReport> {
    let handle = JobHandle::new(args.job_id.clone(), args.kind);

    if args.wait {
        let poller = JobPoller::new(args.poll.policy(args.kind, config), TokioDelay);
        let outcome = poller
            .poll(client, &handle)
            .await
            .with_context(|| format!("failed to poll job {}", handle.job_id))?;
        let report = JobReport::from_outcome(&handle, &outcome);
        return args
            .download
            .apply(config, &handle, outcome.response(), report)
            .await;
    }

    let response = client
        .query(&handle)
        .await
        .with_context(|| format!("failed to query job {}", handle.job_id))?;
    let report = JobReport::from_query(&handle, &response);
    args.download
        .apply(config, &handle, Some(&response), report)
        .await
}
