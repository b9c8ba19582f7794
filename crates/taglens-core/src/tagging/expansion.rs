//! Expansion of seed tags through an external related-hashtags service.
//!
//! The relation service answers `GET {endpoint}/{tag}/10/6` with
//! `{"<tag>": {"related_tags": [tag, weight, tag, weight, ...]}}`.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use std::time::Duration;

use crate::config::ExpansionConfig;
use crate::error::PipelineError;

/// Default number of related tags kept per seed tag.
pub const DEFAULT_RELATED_PER_TAG: usize = 4;

/// Anything that can turn one tag into a few related tags.
#[async_trait]
pub trait TagExpander: Send + Sync {
    /// Related tags for `tag`, most related first.
    async fn expand(&self, tag: &str) -> Result<Vec<String>, PipelineError>;
}

/// Tags produced by [`expand_all`], plus the per-tag failures that were skipped.
#[derive(Debug, Default)]
pub struct Expansion {
    pub tags: Vec<String>,
    pub failures: Vec<PipelineError>,
}

/// Expand every seed tag concurrently and flatten the results in seed order.
///
/// A failing tag contributes nothing; the remaining tags are still expanded.
pub async fn expand_all(
    expander: &dyn TagExpander,
    seeds: &[String],
    timeout: Duration,
) -> Expansion {
    let calls = seeds.iter().map(|tag| async move {
        match tokio::time::timeout(timeout, expander.expand(tag)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout {
                stage: format!("expansion of '{tag}'"),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    });

    // join_all yields results in input order regardless of completion order
    let mut expansion = Expansion::default();
    for (tag, result) in seeds.iter().zip(join_all(calls).await) {
        match result {
            Ok(related) => {
                tracing::debug!("Expanded '{tag}' into {:?}", related);
                expansion.tags.extend(related);
            }
            Err(e) => {
                tracing::warn!("Skipping expansion for '{tag}': {e}");
                expansion.failures.push(e);
            }
        }
    }
    expansion
}

/// Extract the related tags for `tag` from a relation-service response body.
///
/// Takes the first element of each `(tag, weight)` pair, at most `limit`.
pub fn parse_related(tag: &str, body: &Value, limit: usize) -> Result<Vec<String>, PipelineError> {
    let malformed = |message: &str| PipelineError::MalformedResponse {
        tag: tag.to_string(),
        message: message.to_string(),
    };

    let related = body
        .get(tag)
        .ok_or_else(|| malformed("queried tag missing from response"))?
        .get("related_tags")
        .ok_or_else(|| malformed("missing related_tags"))?
        .as_array()
        .ok_or_else(|| malformed("related_tags is not an array"))?;

    related
        .chunks(2)
        .take(limit)
        .map(|pair| {
            pair[0]
                .as_str()
                .map(String::from)
                .ok_or_else(|| malformed("related tag is not a string"))
        })
        .collect()
}

/// HTTP client for the related-hashtags service.
pub struct RelatedTagsClient {
    endpoint: String,
    referer: String,
    limit: usize,
    client: reqwest::Client,
}

impl RelatedTagsClient {
    pub fn new(config: &ExpansionConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            limit: config.related_per_tag,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, tag: &str) -> String {
        format!("{}/{}/10/6", self.endpoint, urlencoding::encode(tag))
    }
}

#[async_trait]
impl TagExpander for RelatedTagsClient {
    async fn expand(&self, tag: &str) -> Result<Vec<String>, PipelineError> {
        let unavailable = |message: String| PipelineError::UpstreamUnavailable {
            tag: tag.to_string(),
            message,
        };

        let resp = self
            .client
            .get(self.url(tag))
            .header("Referer", &self.referer)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }

        let body: Value = resp.json().await.map_err(|e| PipelineError::MalformedResponse {
            tag: tag.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

        parse_related(tag, &body, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, UNREACHABLE};
    use serde_json::json;
    use std::collections::HashMap;

    struct MapExpander {
        related: HashMap<&'static str, Vec<&'static str>>,
        delays: HashMap<&'static str, u64>,
    }

    #[async_trait]
    impl TagExpander for MapExpander {
        async fn expand(&self, tag: &str) -> Result<Vec<String>, PipelineError> {
            if let Some(ms) = self.delays.get(tag) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            match self.related.get(tag) {
                Some(tags) => Ok(tags.iter().map(|t| t.to_string()).collect()),
                None => Err(PipelineError::UpstreamUnavailable {
                    tag: tag.to_string(),
                    message: "HTTP 503".into(),
                }),
            }
        }
    }

    fn seeds(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_related_takes_first_of_each_pair() {
        let body = json!({
            "landscape": {
                "related_tags": ["nature", 12.5, "travel", 9.1, "photography", 7.0,
                                 "mountains", 5.2, "sunset", 4.0, "sky", 1.0]
            }
        });
        let related = parse_related("landscape", &body, 4).unwrap();
        assert_eq!(related, vec!["nature", "travel", "photography", "mountains"]);
    }

    #[test]
    fn test_parse_related_short_list() {
        let body = json!({"sky": {"related_tags": ["clouds", 3]}});
        assert_eq!(parse_related("sky", &body, 4).unwrap(), vec!["clouds"]);
    }

    #[test]
    fn test_parse_related_missing_tag_is_malformed() {
        let body = json!({"other": {"related_tags": []}});
        let err = parse_related("sky", &body, 4).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_related_wrong_shape_is_malformed() {
        let body = json!({"sky": {"related_tags": "clouds"}});
        assert!(parse_related("sky", &body, 4).is_err());

        let body = json!({"sky": {"related_tags": [42, "clouds"]}});
        assert!(parse_related("sky", &body, 4).is_err());

        let body = json!({"sky": {}});
        assert!(parse_related("sky", &body, 4).is_err());
    }

    #[test]
    fn test_url_encodes_tag() {
        let client = RelatedTagsClient::new(&ExpansionConfig::default());
        assert_eq!(
            client.url("hot air"),
            "http://hashtagify.me/data/tags/hot%20air/10/6"
        );
    }

    fn client(endpoint: &str) -> RelatedTagsClient {
        RelatedTagsClient::new(&ExpansionConfig {
            endpoint: endpoint.to_string(),
            ..ExpansionConfig::default()
        })
    }

    #[tokio::test]
    async fn test_expand_unreachable_is_upstream_unavailable() {
        let err = client(UNREACHABLE).expand("sky").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UpstreamUnavailable { ref tag, .. } if tag == "sky"
        ));
    }

    #[tokio::test]
    async fn test_expand_error_status_is_upstream_unavailable() {
        let endpoint = serve_once(503, "text/plain", b"busy".to_vec()).await;
        let err = client(&endpoint).expand("sky").await.unwrap_err();
        match err {
            PipelineError::UpstreamUnavailable { message, .. } => {
                assert!(message.contains("503"), "{message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_expand_invalid_json_is_malformed() {
        let endpoint = serve_once(200, "application/json", b"<html>".to_vec()).await;
        let err = client(&endpoint).expand("sky").await.unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_expand_reads_related_tags() {
        let body = json!({"sky": {"related_tags": ["clouds", 3.0, "blue", 2.0]}});
        let endpoint = serve_once(200, "application/json", body.to_string().into_bytes()).await;
        let related = client(&endpoint).expand("sky").await.unwrap();
        assert_eq!(related, vec!["clouds", "blue"]);
    }

    #[tokio::test]
    async fn test_expand_all_preserves_seed_order() {
        let expander = MapExpander {
            related: HashMap::from([("a", vec!["a1", "a2"]), ("b", vec!["b1"])]),
            // "a" finishes last
            delays: HashMap::from([("a", 50)]),
        };
        let result = expand_all(&expander, &seeds(&["a", "b"]), Duration::from_secs(5)).await;
        assert_eq!(result.tags, vec!["a1", "a2", "b1"]);
        assert!(result.failures.is_empty());
    }

    #[tokio::test]
    async fn test_expand_all_drops_failed_tag_and_continues() {
        let expander = MapExpander {
            related: HashMap::from([("a", vec!["a1"]), ("c", vec!["c1"])]),
            delays: HashMap::new(),
        };
        let result = expand_all(&expander, &seeds(&["a", "b", "c"]), Duration::from_secs(5)).await;
        assert_eq!(result.tags, vec!["a1", "c1"]);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            result.failures[0],
            PipelineError::UpstreamUnavailable { ref tag, .. } if tag == "b"
        ));
    }

    #[tokio::test]
    async fn test_expand_all_times_out_slow_tag() {
        let expander = MapExpander {
            related: HashMap::from([("slow", vec!["s1"]), ("fast", vec!["f1"])]),
            delays: HashMap::from([("slow", 500)]),
        };
        let result =
            expand_all(&expander, &seeds(&["slow", "fast"]), Duration::from_millis(50)).await;
        assert_eq!(result.tags, vec!["f1"]);
        assert!(matches!(result.failures[0], PipelineError::Timeout { .. }));
    }
}
