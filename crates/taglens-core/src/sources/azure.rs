//! Azure Computer Vision: image tags and captions.
//!
//! Both endpoints take the raw image bytes as the request body and
//! authenticate with a subscription key header.

use super::provider::{send_json, CaptionSource, ImageInput, LabelSource};
use crate::error::PipelineError;
use crate::types::LabelSet;
use async_trait::async_trait;
use serde::Deserialize;

/// Azure Computer Vision provider.
pub struct AzureVision {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl AzureVision {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, operation: &str, image: &ImageInput) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/vision/v1.0/{operation}", self.endpoint))
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(image.bytes.clone())
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct TagResponse {
    tags: Vec<AzureTag>,
}

#[derive(Deserialize)]
struct AzureTag {
    name: String,
    confidence: f32,
}

#[derive(Deserialize)]
struct DescribeResponse {
    description: Description,
}

#[derive(Deserialize)]
struct Description {
    #[serde(default)]
    captions: Vec<Caption>,
}

#[derive(Deserialize)]
struct Caption {
    text: String,
}

fn tags_to_labels(resp: TagResponse) -> LabelSet {
    resp.tags
        .into_iter()
        .map(|t| (t.name, t.confidence))
        .collect()
}

fn captions_from(resp: DescribeResponse) -> Vec<String> {
    resp.description
        .captions
        .into_iter()
        .map(|c| c.text)
        .collect()
}

#[async_trait]
impl LabelSource for AzureVision {
    fn name(&self) -> &str {
        "azure"
    }

    async fn labels(&self, image: &ImageInput) -> Result<LabelSet, PipelineError> {
        let resp: TagResponse =
            send_json(LabelSource::name(self), self.request("tag", image)).await?;
        Ok(tags_to_labels(resp))
    }
}

#[async_trait]
impl CaptionSource for AzureVision {
    fn name(&self) -> &str {
        "azure"
    }

    async fn captions(&self, image: &ImageInput) -> Result<Vec<String>, PipelineError> {
        let resp: DescribeResponse =
            send_json(CaptionSource::name(self), self.request("describe", image)).await?;
        Ok(captions_from(resp))
    }
}
