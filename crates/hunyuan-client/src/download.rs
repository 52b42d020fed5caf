//! Result file download.
//!
//! A finished job lists its models in `ResultFile3Ds`. [`Downloader`] fetches
//! each model and its preview image into a fresh directory named after the
//! download time and the job id, then unpacks every `.zip` it saved next to
//! the archive.
//!
//! A file that cannot be fetched does not stop the others; its URL is listed
//! in [`DownloadedFiles::failed`].

use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::job::{JobHandle, QueryResponse, ResultFile};

/// What a download run saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedFiles {
    /// Directory the files were written to.
    pub output_dir: PathBuf,
    /// Every file written, downloads first, then extracted archive members.
    pub files: Vec<PathBuf>,
    /// URLs that could not be downloaded.
    pub failed: Vec<String>,
}

/// Fetches result files over HTTP(S).
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Download every result file of a successfully finished job.
    ///
    /// Files go to [`job_output_dir`] under `base_dir`; model files are named
    /// `{job}_{type}.{ext}` and previews `{job}_{type}_preview.png`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidRequest`] if `response` is not a success status.
    /// - [`ClientError::Io`] if the output directory cannot be created.
    pub async fn download_results(
        &self,
        handle: &JobHandle,
        response: &QueryResponse,
        base_dir: &Path,
    ) -> ClientResult<DownloadedFiles> {
        if !response.job_status().is_success() {
            return Err(ClientError::InvalidRequest(format!(
                "job {} has status {:?}, results are not available",
                handle.job_id, response.status
            )));
        }

        let output_dir = job_output_dir(base_dir, &handle.job_id, &Local::now());
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| ClientError::io(&output_dir, e))?;

        let mut downloaded = DownloadedFiles {
            output_dir: output_dir.clone(),
            files: Vec::new(),
            failed: Vec::new(),
        };

        for file in response.result_files() {
            info!(
                job_id = %handle.job_id,
                file_type = %file.file_type,
                url = %file.url,
                "Downloading result file"
            );
            let name = result_file_name(&handle.job_id, file);
            self.fetch_into(&file.url, &output_dir, &name, &mut downloaded).await;

            if let Some(preview) = &file.preview_image_url {
                let name = preview_file_name(&handle.job_id, file);
                self.fetch_into(preview, &output_dir, &name, &mut downloaded).await;
            }
        }

        let archives: Vec<PathBuf> = downloaded
            .files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")))
            .cloned()
            .collect();
        for archive in archives {
            match extract_zip(&archive, &output_dir).await {
                Ok(extracted) => {
                    info!(
                        archive = %archive.display(),
                        count = extracted.len(),
                        "Extracted archive"
                    );
                    downloaded.files.extend(extracted);
                }
                Err(e) => {
                    warn!(archive = %archive.display(), error = %e, "Failed to extract archive");
                }
            }
        }

        Ok(downloaded)
    }

    /// Download `url` to `dir/file_name` and return the written path.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if the request fails.
    /// - [`ClientError::HttpStatus`] for a non-success status.
    /// - [`ClientError::Io`] if the file cannot be written.
    pub async fn download_file(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
    ) -> ClientResult<PathBuf> {
        debug!(url, file_name, "Downloading file");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ClientError::io(&path, e))?;
        Ok(path)
    }

    async fn fetch_into(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
        downloaded: &mut DownloadedFiles,
    ) {
        match self.download_file(url, dir, file_name).await {
            Ok(path) => downloaded.files.push(path),
            Err(e) => {
                warn!(url, error = %e, "Failed to download file");
                downloaded.failed.push(url.to_owned());
            }
        }
    }
}

/// Directory for one download run: `{base}/{YYYYmmdd_HHMMSS}_{job id prefix}_download`.
///
/// The job id is cut to 8 characters and anything outside `[A-Za-z0-9_-]`
/// becomes `_`, so the name never leaves `base_dir`.
#[must_use]
pub fn job_output_dir<Tz>(base_dir: &Path, job_id: &str, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let prefix: String = file_name_safe(job_id).chars().take(8).collect();
    base_dir.join(format!("{}_{prefix}_download", at.format("%Y%m%d_%H%M%S")))
}

/// Unpack `archive` into `output_dir` and return the extracted file paths.
///
/// Entries whose names would escape `output_dir` are skipped.
///
/// # Errors
///
/// - [`ClientError::Io`] if the archive cannot be read or a file cannot be written.
/// - [`ClientError::Archive`] if the archive is malformed.
pub async fn extract_zip(archive: &Path, output_dir: &Path) -> ClientResult<Vec<PathBuf>> {
    let archive = archive.to_path_buf();
    let output_dir = output_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive, &output_dir))
        .await
        .map_err(|e| ClientError::Archive(format!("extraction task failed: {e}")))?
}

fn extract_zip_blocking(archive: &Path, output_dir: &Path) -> ClientResult<Vec<PathBuf>> {
    let file = File::open(archive).map_err(|e| ClientError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| ClientError::Archive(format!("{}: {e}", archive.display())))?;

    let mut extracted = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| ClientError::Archive(format!("{}: {e}", archive.display())))?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(name = entry.name(), "Skipping archive entry outside the output directory");
            continue;
        };
        let target = output_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| ClientError::io(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| ClientError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| ClientError::io(&target, e))?;
        extracted.push(target);
    }

    Ok(extracted)
}

fn result_file_name(job_id: &str, file: &ResultFile) -> String {
    let file_type = file_name_safe(&file.file_type.to_ascii_lowercase());
    let extension = if file.url.contains(".zip") {
        "zip".to_owned()
    } else if file_type.is_empty() {
        extension_from_url(&file.url).to_owned()
    } else {
        file_type.clone()
    };
    format!("{}_{file_type}.{extension}", file_name_safe(job_id))
}

fn preview_file_name(job_id: &str, file: &ResultFile) -> String {
    format!(
        "{}_{}_preview.png",
        file_name_safe(job_id),
        file_name_safe(&file.file_type.to_ascii_lowercase())
    )
}

fn extension_from_url(url: &str) -> &'static str {
    const KNOWN: [(&str, &str); 7] = [
        (".zip", "zip"),
        (".glb", "glb"),
        (".fbx", "fbx"),
        (".obj", "obj"),
        (".usdz", "usdz"),
        (".stl", "stl"),
        (".png", "png"),
    ];
    KNOWN
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map_or("bin", |(_, ext)| ext)
}

fn file_name_safe(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
