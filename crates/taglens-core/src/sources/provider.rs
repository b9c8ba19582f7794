//! Label and caption source traits, the shared image payload, and the
//! factory that builds concrete providers from config.

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;

use crate::config::{resolve_env_var, SourcesConfig};
use crate::error::PipelineError;
use crate::types::LabelSet;

/// Label providers that can be listed in `sources.enabled`.
pub const LABEL_PROVIDERS: &[&str] = &["azure", "google", "rekognition", "imagga"];

/// Providers that can be selected as `sources.caption`.
pub const CAPTION_PROVIDERS: &[&str] = &["azure"];

/// Image bytes ready to send to a labeling API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: Vec<u8>, format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
            bytes,
            media_type: media_type.to_string(),
        }
    }

    /// Detect the format from the bytes themselves.
    ///
    /// Returns `None` if the bytes are not a recognizable image.
    pub fn sniff(bytes: Vec<u8>) -> Option<Self> {
        let format = match image::guess_format(&bytes).ok()? {
            image::ImageFormat::Jpeg => "jpeg",
            image::ImageFormat::Png => "png",
            image::ImageFormat::WebP => "webp",
            image::ImageFormat::Gif => "gif",
            image::ImageFormat::Bmp => "bmp",
            _ => return None,
        };
        Some(Self::from_bytes(bytes, format))
    }
}

/// A service that labels images with confidence scores.
///
/// Uses `async_trait` because the pipeline holds providers as
/// `Box<dyn LabelSource>`.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Provider name for logging (e.g., "azure", "google").
    fn name(&self) -> &str;

    /// Label the image.
    async fn labels(&self, image: &ImageInput) -> Result<LabelSet, PipelineError>;
}

/// A service that describes images in a sentence or two.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    fn name(&self) -> &str;

    /// Captions for the image, best first. May be empty.
    async fn captions(&self, image: &ImageInput) -> Result<Vec<String>, PipelineError>;
}

/// Send a provider request and decode its JSON body.
///
/// Non-2xx responses become `PipelineError::Source` carrying the status code.
pub(crate) async fn send_json<T: DeserializeOwned>(
    source: &str,
    request: reqwest::RequestBuilder,
) -> Result<T, PipelineError> {
    let resp = request.send().await.map_err(|e| PipelineError::Source {
        source_name: source.to_string(),
        message: format!("request failed: {e}"),
        status_code: None,
    })?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(PipelineError::Source {
            source_name: source.to_string(),
            message: format!("HTTP {status}: {text}"),
            status_code: Some(status.as_u16()),
        });
    }

    resp.json().await.map_err(|e| PipelineError::Source {
        source_name: source.to_string(),
        message: format!("failed to parse response: {e}"),
        status_code: None,
    })
}

fn missing_key(source: &str, hint: &str) -> PipelineError {
    PipelineError::Source {
        source_name: source.to_string(),
        message: format!("API key not set. {hint}"),
        status_code: None,
    }
}

/// Factory that creates providers by name from the sources config.
pub struct SourceFactory;

impl SourceFactory {
    /// Create a label source.
    ///
    /// Async because Rekognition resolves the shared AWS config on creation.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("azure", "google", "rekognition", "imagga")
    /// * `config` - The full sources config section
    pub async fn label_source(
        provider: &str,
        config: &SourcesConfig,
    ) -> Result<Box<dyn LabelSource>, PipelineError> {
        match provider {
            "azure" => {
                let api_key = resolve_env_var(&config.azure.api_key)
                    .ok_or_else(|| missing_key("azure", "Set AZURE_KEY env var."))?;
                Ok(Box::new(super::azure::AzureVision::new(
                    &config.azure.endpoint,
                    &api_key,
                )))
            }
            "google" => {
                let api_key = resolve_env_var(&config.google.api_key)
                    .ok_or_else(|| missing_key("google", "Set GOOGLE_VISION_KEY env var."))?;
                Ok(Box::new(super::google::GoogleVision::new(
                    &config.google,
                    &api_key,
                )))
            }
            "rekognition" => Ok(Box::new(
                super::rekognition::Rekognition::from_config(&config.rekognition).await,
            )),
            "imagga" => {
                let api_key = resolve_env_var(&config.imagga.api_key)
                    .ok_or_else(|| missing_key("imagga", "Set IMAGGA_KEY env var."))?;
                let api_secret = resolve_env_var(&config.imagga.api_secret)
                    .ok_or_else(|| missing_key("imagga", "Set IMAGGA_SECRET env var."))?;
                Ok(Box::new(super::imagga::Imagga::new(
                    &config.imagga.endpoint,
                    &api_key,
                    &api_secret,
                )))
            }
            other => Err(PipelineError::Source {
                source_name: other.to_string(),
                message: format!("Unknown label provider: {other}"),
                status_code: None,
            }),
        }
    }

    /// Create a caption source.
    pub fn caption_source(
        provider: &str,
        config: &SourcesConfig,
    ) -> Result<Box<dyn CaptionSource>, PipelineError> {
        match provider {
            "azure" => {
                let api_key = resolve_env_var(&config.azure.api_key)
                    .ok_or_else(|| missing_key("azure", "Set AZURE_KEY env var."))?;
                Ok(Box::new(super::azure::AzureVision::new(
                    &config.azure.endpoint,
                    &api_key,
                )))
            }
            other => Err(PipelineError::Source {
                source_name: other.to_string(),
                message: format!("Unknown caption provider: {other}"),
                status_code: None,
            }),
        }
    }
}
