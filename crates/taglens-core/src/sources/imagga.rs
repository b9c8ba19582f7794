//! Imagga tagging API.
//!
//! Confidences are reported on a 0-100 scale and passed through unchanged.

use super::provider::{send_json, ImageInput, LabelSource};
use crate::error::PipelineError;
use crate::types::LabelSet;
use async_trait::async_trait;
use serde::Deserialize;

/// Imagga provider using `POST /tags` with a base64 image.
pub struct Imagga {
    endpoint: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

impl Imagga {
    pub fn new(endpoint: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct TagsResponse {
    result: TagsResult,
}

#[derive(Deserialize)]
struct TagsResult {
    tags: Vec<ImaggaTag>,
}

#[derive(Deserialize)]
struct ImaggaTag {
    confidence: f32,
    tag: LocalizedTag,
}

#[derive(Deserialize)]
struct LocalizedTag {
    en: String,
}

fn to_labels(resp: TagsResponse) -> LabelSet {
    resp.result
        .tags
        .into_iter()
        .map(|t| (t.tag.en, t.confidence))
        .collect()
}

#[async_trait]
impl LabelSource for Imagga {
    fn name(&self) -> &str {
        "imagga"
    }

    async fn labels(&self, image: &ImageInput) -> Result<LabelSet, PipelineError> {
        let request = self
            .client
            .post(format!("{}/tags", self.endpoint))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("image_base64", image.data.as_str())]);

        let resp: TagsResponse = send_json(self.name(), request).await?;
        Ok(to_labels(resp))
    }
}
