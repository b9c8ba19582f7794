//! AWS Rekognition `DetectLabels`.
//!
//! Credentials come from the standard AWS provider chain (environment,
//! shared profile, instance metadata). Confidences are on a 0-100 scale.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Image, Label};

use super::provider::{ImageInput, LabelSource};
use crate::config::{resolve_env_var, RekognitionConfig};
use crate::error::PipelineError;
use crate::types::LabelSet;

/// Region used when neither the config nor `AWS_REGION` names one.
const DEFAULT_REGION: &str = "us-east-1";

/// Rekognition provider.
pub struct Rekognition {
    client: aws_sdk_rekognition::Client,
    max_labels: i32,
    min_confidence: f32,
}

impl Rekognition {
    /// Load the shared AWS config and build a client for the configured region.
    pub async fn from_config(config: &RekognitionConfig) -> Self {
        let region = resolve_env_var(&config.region).unwrap_or_else(|| DEFAULT_REGION.to_string());
        tracing::debug!("Rekognition region: {region}");

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;
        Self::new(aws_sdk_rekognition::Client::new(&sdk_config), config)
    }

    pub fn new(client: aws_sdk_rekognition::Client, config: &RekognitionConfig) -> Self {
        Self {
            client,
            max_labels: config.max_labels,
            min_confidence: config.min_confidence,
        }
    }
}

/// Labels without a name or confidence are skipped.
fn to_labels(labels: &[Label]) -> LabelSet {
    labels
        .iter()
        .filter_map(|label| Some((label.name()?, label.confidence()?)))
        .collect()
}

#[async_trait]
impl LabelSource for Rekognition {
    fn name(&self) -> &str {
        "rekognition"
    }

    async fn labels(&self, image: &ImageInput) -> Result<LabelSet, PipelineError> {
        let output = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.bytes.clone())).build())
            .max_labels(self.max_labels)
            .min_confidence(self.min_confidence)
            .send()
            .await
            .map_err(|e| PipelineError::Source {
                source_name: self.name().to_string(),
                message: DisplayErrorContext(&e).to_string(),
                status_code: e.raw_response().map(|resp| resp.status().as_u16()),
            })?;

        Ok(to_labels(output.labels()))
    }
}
