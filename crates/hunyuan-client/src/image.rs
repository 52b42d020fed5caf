//! Image input normalization.
//!
//! Image-to-3D jobs take either an `ImageUrl` the service can fetch or inline
//! `ImageBase64` data. Callers usually have neither in that exact form: they
//! hold a local file, a `data:` URL copied from a browser, or a raw base64
//! string. [`ImageSource`] classifies such an input and
//! [`ImageSource::resolve`] turns it into an [`ImageInput`] that can go into a
//! [`GenerateRequest`](crate::GenerateRequest).

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Largest image, in bytes, accepted for inline upload.
pub const MAX_IMAGE_BYTES: usize = 6 * 1024 * 1024;

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:image/png;base64,...`
    DataUrl(String),
    /// A file on the local file system.
    LocalPath(PathBuf),
    /// An `http://` or `https://` URL the service fetches itself.
    RemoteUrl(String),
    /// Raw base64 image data.
    Base64(String),
}

/// An image ready to be placed into a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Sent as `ImageUrl`.
    Url(String),
    /// Sent as `ImageBase64`.
    Base64(String),
}

impl ImageSource {
    /// Classify a free-form image input.
    ///
    /// Data URLs and `http(s)` URLs are recognized by prefix. Anything else
    /// is a local path when such a file exists, and base64 data otherwise.
    #[must_use]
    pub fn detect(input: &str) -> Self {
        if input.starts_with("data:") {
            Self::DataUrl(input.to_owned())
        } else if input.starts_with("http://") || input.starts_with("https://") {
            Self::RemoteUrl(input.to_owned())
        } else if Path::new(input).is_file() {
            Self::LocalPath(PathBuf::from(input))
        } else {
            Self::Base64(input.to_owned())
        }
    }

    /// Read, validate and encode the image.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Io`] if a local file cannot be read.
    /// - [`ClientError::InvalidRequest`] for a data URL without base64
    ///   payload, data that is not base64, or an image larger than
    ///   [`MAX_IMAGE_BYTES`].
    pub async fn resolve(self) -> ClientResult<ImageInput> {
        match self {
            Self::RemoteUrl(url) => Ok(ImageInput::Url(url)),
            Self::DataUrl(url) => {
                let data = extract_base64_from_data_url(&url).ok_or_else(|| {
                    ClientError::InvalidRequest("data URL does not carry base64 data".to_owned())
                })?;
                validate_base64(data)?;
                Ok(ImageInput::Base64(data.to_owned()))
            }
            Self::LocalPath(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| ClientError::io(&path, e))?;
                ensure_size(bytes.len())?;
                debug!(path = %path.display(), size = bytes.len(), "Encoded local image");
                Ok(ImageInput::Base64(BASE64.encode(bytes)))
            }
            Self::Base64(data) => {
                validate_base64(&data)?;
                Ok(ImageInput::Base64(data))
            }
        }
    }
}

/// The base64 payload of a `data:<mime>;base64,<data>` URL.
///
/// Returns `None` for anything that is not a data URL or whose metadata does
/// not declare base64 encoding.
///
/// # Examples
///
/// ```
/// use hunyuan_client::image::extract_base64_from_data_url;
///
/// assert_eq!(
///     extract_base64_from_data_url("data:image/png;base64,iVBORw0KGgo="),
///     Some("iVBORw0KGgo=")
/// );
/// assert_eq!(extract_base64_from_data_url("https://example.com/cat.png"), None);
/// ```
#[must_use]
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let (metadata, data) = rest.split_once(',')?;
    metadata.contains("base64").then_some(data)
}

fn validate_base64(data: &str) -> ClientResult<()> {
    let decoded = BASE64
        .decode(data)
        .map_err(|e| ClientError::InvalidRequest(format!("image is not valid base64: {e}")))?;
    ensure_size(decoded.len())
}

fn ensure_size(len: usize) -> ClientResult<()> {
    if len > MAX_IMAGE_BYTES {
        return Err(ClientError::InvalidRequest(format!(
            "image is {len} bytes, the limit is {MAX_IMAGE_BYTES}"
        )));
    }
    Ok(())
}
