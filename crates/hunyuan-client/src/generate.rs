//! Generation request shaping.
//!
//! A [`GenerateRequest`] collects every input a caller may supply. Each job
//! kind accepts a different subset, so [`GenerateRequest::to_params`]
//! validates the combination and emits the JSON body for one kind.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::image::{ImageInput, ImageSource};
use crate::job::JobKind;

/// Face counts accepted by professional jobs.
pub const FACE_COUNT_RANGE: RangeInclusive<u32> = 40_000..=1_500_000;

/// Longest prompt, in characters, that rapid jobs handle in full.
pub const RAPID_PROMPT_LIMIT: usize = 200;

/// Result format of rapid jobs when none is given.
pub const DEFAULT_RAPID_RESULT_FORMAT: &str = "OBJ";

/// Generation mode of standard and professional jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerateType {
    /// Textured model.
    #[default]
    Normal,
    /// Low polygon model.
    LowPoly,
    /// Untextured geometry.
    Geometry,
    /// Sketch plus text.
    Sketch,
}

impl GenerateType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::LowPoly => "LowPoly",
            Self::Geometry => "Geometry",
            Self::Sketch => "Sketch",
        }
    }
}

impl FromStr for GenerateType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "lowpoly" | "low-poly" => Ok(Self::LowPoly),
            "geometry" => Ok(Self::Geometry),
            "sketch" => Ok(Self::Sketch),
            other => Err(invalid(format!("unknown generate type {other:?}"))),
        }
    }
}

/// Polygon type of `LowPoly` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonType {
    /// Triangle faces.
    Triangle,
    /// Quad faces.
    Quadrilateral,
}

impl PolygonType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::Quadrilateral => "quadrilateral",
        }
    }
}

impl FromStr for PolygonType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" => Ok(Self::Triangle),
            "quadrilateral" | "quad" => Ok(Self::Quadrilateral),
            other => Err(invalid(format!("unknown polygon type {other:?}"))),
        }
    }
}

/// An extra view of the subject for professional jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewImage {
    /// `left`, `right` or `back`.
    pub view_type: String,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_image_url: Option<String>,
    /// Base64 image data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_image_base64: Option<String>,
}

/// Every input a generation job can take.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Text description of the model.
    pub prompt: Option<String>,
    /// URL of an input image.
    pub image_url: Option<String>,
    /// Base64 data of an input image.
    pub image_base64: Option<String>,
    /// Extra views (professional only).
    #[serde(default)]
    pub multi_view_images: Vec<ViewImage>,
    /// Output format (rapid only), e.g. `obj` or `glb`.
    pub result_format: Option<String>,
    /// Generate PBR materials.
    pub enable_pbr: Option<bool>,
    /// Target face count (standard and professional).
    pub face_count: Option<u32>,
    /// Generation mode (standard and professional).
    pub generate_type: Option<GenerateType>,
    /// Polygon type, only with [`GenerateType::LowPoly`] (professional only).
    pub polygon_type: Option<PolygonType>,
}

impl GenerateRequest {
    /// A text-to-3D request.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// An image-to-3D request.
    pub fn from_image_url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Use `input` as the primary image, replacing any previous one.
    #[must_use]
    pub fn with_image(mut self, input: ImageInput) -> Self {
        match input {
            ImageInput::Url(url) => {
                self.image_url = Some(url);
                self.image_base64 = None;
            }
            ImageInput::Base64(data) => {
                self.image_url = None;
                self.image_base64 = Some(data);
            }
        }
        self
    }

    /// Turn image "URLs" the service cannot fetch into inline base64.
    ///
    /// `image_url` and every view's `view_image_url` go through
    /// [`ImageSource::detect`]: `http(s)` URLs stay as they are, data URLs and
    /// local files are encoded.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`ImageSource::resolve`].
    pub async fn resolve_images(mut self) -> ClientResult<Self> {
        if let Some(url) = self.image_url.take() {
            self = self.with_image(ImageSource::detect(&url).resolve().await?);
        }
        for view in &mut self.multi_view_images {
            if let Some(url) = view.view_image_url.take() {
                match ImageSource::detect(&url).resolve().await? {
                    ImageInput::Url(url) => view.view_image_url = Some(url),
                    ImageInput::Base64(data) => view.view_image_base64 = Some(data),
                }
            }
        }
        Ok(self)
    }

    fn has_text(&self) -> bool {
        self.prompt.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    fn has_image(&self) -> bool {
        self.image_url.is_some() || self.image_base64.is_some()
    }

    /// Validate the request for `kind` and build the submit body.
    ///
    /// When text and an image are both given and no generation mode is set,
    /// standard and professional jobs switch to [`GenerateType::Sketch`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] when the inputs do not form a
    /// valid request for `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hunyuan_client::{GenerateRequest, JobKind};
    ///
    /// let params = GenerateRequest::from_prompt("a cute cat")
    ///     .to_params(JobKind::Rapid)
    ///     .unwrap();
    /// assert_eq!(params["ResultFormat"], "OBJ");
    /// ```
    pub fn to_params(&self, kind: JobKind) -> ClientResult<Value> {
        self.validate_common()?;

        let mut body = Map::new();
        if let Some(prompt) = self.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            body.insert("Prompt".to_owned(), json!(prompt));
        }
        if let Some(base64) = &self.image_base64 {
            body.insert("ImageBase64".to_owned(), json!(base64));
        }
        if let Some(url) = &self.image_url {
            body.insert("ImageUrl".to_owned(), json!(url));
        }
        if let Some(enable_pbr) = self.enable_pbr {
            body.insert("EnablePBR".to_owned(), json!(enable_pbr));
        }

        match kind {
            JobKind::Professional => self.shape_professional(&mut body)?,
            JobKind::Standard => self.shape_standard(&mut body)?,
            JobKind::Rapid => self.shape_rapid(&mut body)?,
        }

        Ok(Value::Object(body))
    }

    fn validate_common(&self) -> ClientResult<()> {
        if !self.has_text() && !self.has_image() {
            return Err(invalid("a prompt or an image is required"));
        }
        if self.image_url.is_some() && self.image_base64.is_some() {
            return Err(invalid("image_url and image_base64 are mutually exclusive"));
        }
        Ok(())
    }

    fn generate_type_for_inputs(&self) -> ClientResult<Option<GenerateType>> {
        if !(self.has_text() && self.has_image()) {
            return Ok(self.generate_type);
        }
        match self.generate_type {
            None => {
                info!("Text and image given together, using Sketch mode");
                Ok(Some(GenerateType::Sketch))
            }
            Some(GenerateType::Sketch) => Ok(Some(GenerateType::Sketch)),
            Some(other) => Err(invalid(format!(
                "text and image cannot be combined in {} mode, only in Sketch mode",
                other.as_str()
            ))),
        }
    }

    fn shape_professional(&self, body: &mut Map<String, Value>) -> ClientResult<()> {
        self.reject_result_format(JobKind::Professional)?;

        if !self.multi_view_images.is_empty() {
            body.insert("MultiViewImages".to_owned(), json!(self.multi_view_images));
        }
        if let Some(face_count) = self.face_count {
            if !FACE_COUNT_RANGE.contains(&face_count) {
                return Err(invalid(format!(
                    "face_count must be between {} and {}, got {face_count}",
                    FACE_COUNT_RANGE.start(),
                    FACE_COUNT_RANGE.end()
                )));
            }
            body.insert("FaceCount".to_owned(), json!(face_count));
        }

        let generate_type = self.generate_type_for_inputs()?;
        if let Some(generate_type) = generate_type {
            body.insert("GenerateType".to_owned(), json!(generate_type.as_str()));
        }
        if let Some(polygon_type) = self.polygon_type {
            if generate_type != Some(GenerateType::LowPoly) {
                return Err(invalid("polygon_type is only valid in LowPoly mode"));
            }
            body.insert("PolygonType".to_owned(), json!(polygon_type.as_str()));
        }
        Ok(())
    }

    fn shape_standard(&self, body: &mut Map<String, Value>) -> ClientResult<()> {
        self.reject_result_format(JobKind::Standard)?;
        if !self.multi_view_images.is_empty() {
            return Err(unsupported(JobKind::Standard, "multi_view_images"));
        }
        if self.polygon_type.is_some() {
            return Err(unsupported(JobKind::Standard, "polygon_type"));
        }

        if let Some(face_count) = self.face_count {
            body.insert("FaceCount".to_owned(), json!(face_count));
        }
        if let Some(generate_type) = self.generate_type_for_inputs()? {
            body.insert("GenerateType".to_owned(), json!(generate_type.as_str()));
        }
        Ok(())
    }

    fn shape_rapid(&self, body: &mut Map<String, Value>) -> ClientResult<()> {
        if self.has_text() && self.has_image() {
            return Err(invalid("rapid jobs take either a prompt or an image, not both"));
        }
        if !self.multi_view_images.is_empty() {
            return Err(unsupported(JobKind::Rapid, "multi_view_images"));
        }
        if self.face_count.is_some() {
            return Err(unsupported(JobKind::Rapid, "face_count"));
        }
        if self.generate_type.is_some() {
            return Err(unsupported(JobKind::Rapid, "generate_type"));
        }
        if self.polygon_type.is_some() {
            return Err(unsupported(JobKind::Rapid, "polygon_type"));
        }

        if let Some(prompt) = &self.prompt {
            let chars = prompt.chars().count();
            if chars > RAPID_PROMPT_LIMIT {
                warn!(
                    chars,
                    limit = RAPID_PROMPT_LIMIT,
                    "Prompt is longer than rapid jobs accept"
                );
            }
        }

        let format = self
            .result_format
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map_or_else(
                || DEFAULT_RAPID_RESULT_FORMAT.to_owned(),
                str::to_ascii_uppercase,
            );
        body.insert("ResultFormat".to_owned(), json!(format));
        Ok(())
    }

    fn reject_result_format(&self, kind: JobKind) -> ClientResult<()> {
        if self.result_format.is_some() {
            return Err(unsupported(kind, "result_format"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ClientError {
    ClientError::InvalidRequest(message.into())
}

fn unsupported(kind: JobKind, field: &str) -> ClientError {
    invalid(format!("{field} is not supported by {kind} jobs"))
}
