//! Google Cloud Vision: label detection combined with web entities.
//!
//! Web entities widen the vocabulary with named things (landmarks, brands)
//! that plain label detection misses. Their scores are on a different scale
//! and are divided by 100 before merging; plain labels win on collisions.

use std::collections::HashMap;

use super::provider::{send_json, ImageInput, LabelSource};
use crate::config::GoogleConfig;
use crate::error::PipelineError;
use crate::types::{normalize_label, LabelSet};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Google Cloud Vision provider using `images:annotate`.
pub struct GoogleVision {
    endpoint: String,
    api_key: String,
    min_score: f32,
    single_word_only: bool,
    client: reqwest::Client,
}

impl GoogleVision {
    pub fn new(config: &GoogleConfig, api_key: &str) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            min_score: config.min_score,
            single_word_only: config.single_word_only,
            client: reqwest::Client::new(),
        }
    }

    /// Merge labels and web entities into a single filtered, score-ordered set.
    fn merge(&self, response: AnnotateResponse) -> Result<LabelSet, PipelineError> {
        let result = response
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Source {
                source_name: "google".to_string(),
                message: "empty annotate response".to_string(),
                status_code: None,
            })?;

        if let Some(error) = result.error {
            return Err(PipelineError::Source {
                source_name: "google".to_string(),
                message: error.message,
                status_code: None,
            });
        }

        let web = result
            .web_detection
            .map(|w| w.web_entities)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| Some((e.description?, e.score / 100.0)));
        let labels = result
            .label_annotations
            .into_iter()
            .filter_map(|a| Some((a.description?, a.score)));

        let mut merged: HashMap<String, f32> = HashMap::new();
        for (description, score) in web {
            merged.insert(normalize_label(&description), score);
        }
        for (description, score) in labels {
            merged.insert(normalize_label(&description), score);
        }

        let mut kept: Vec<(String, f32)> = merged
            .into_iter()
            .filter(|(label, _)| !label.is_empty())
            .filter(|(label, _)| !self.single_word_only || !label.contains(char::is_whitespace))
            .filter(|(_, score)| *score >= self.min_score)
            .collect();
        kept.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(kept.into_iter().collect())
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    label_annotations: Vec<Annotation>,
    web_detection: Option<WebDetection>,
    error: Option<AnnotateError>,
}

#[derive(Deserialize)]
struct Annotation {
    description: Option<String>,
    #[serde(default)]
    score: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebDetection {
    #[serde(default)]
    web_entities: Vec<Annotation>,
}

#[derive(Deserialize)]
struct AnnotateError {
    message: String,
}

#[async_trait]
impl LabelSource for GoogleVision {
    fn name(&self) -> &str {
        "google"
    }

    async fn labels(&self, image: &ImageInput) -> Result<LabelSet, PipelineError> {
        let body = json!({
            "requests": [{
                "image": { "content": image.data },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": 50 },
                    { "type": "WEB_DETECTION", "maxResults": 50 }
                ]
            }]
        });

        let request = self
            .client
            .post(format!("{}/images:annotate", self.endpoint))
            .query(&[("key", &self.api_key)])
            .json(&body);

        let resp: AnnotateResponse = send_json(self.name(), request).await?;
        self.merge(resp)
    }
}
