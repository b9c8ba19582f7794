//! HTTP API for the tagging pipeline.
//!
//! `GET /api?url=&password=` runs the pipeline when the password matches the
//! configured access token. Any other request gets the static example payload,
//! and so does every request when no pipeline could be built, so the page
//! keeps working as a demo without credentials.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taglens_core::Pipeline;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const EXAMPLE_PAYLOAD: &str = include_str!("../assets/example.json");

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Option<Arc<Pipeline>>,
    access_token: Option<Arc<str>>,
    example: Arc<str>,
}

impl AppState {
    /// A `pipeline` or `access_token` of `None` locks the API: every request
    /// gets the example.
    pub fn new(
        pipeline: Option<Pipeline>,
        access_token: Option<String>,
        example: Option<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.map(Arc::new),
            access_token: access_token.filter(|t| !t.is_empty()).map(Arc::from),
            example: Arc::from(example.unwrap_or_else(|| EXAMPLE_PAYLOAD.to_string())),
        }
    }

    fn authorized(&self, password: Option<&str>) -> bool {
        match (&self.access_token, password) {
            (Some(token), Some(password)) => token.as_ref() == password,
            _ => false,
        }
    }
}

/// Query parameters of `GET /api`.
#[derive(Debug, Deserialize)]
pub struct ApiParams {
    url: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: taglens_core::VERSION,
    })
}

/// GET /api
async fn api(State(state): State<AppState>, Query(params): Query<ApiParams>) -> Response {
    let url = params.url.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let authorized = state.authorized(params.password.as_deref());
    let (Some(url), Some(pipeline), true) = (url, state.pipeline.as_ref(), authorized) else {
        return (
            [(header::CONTENT_TYPE, "application/json")],
            state.example.to_string(),
        )
            .into_response();
    };

    tracing::info!("Tagging {url}");
    match pipeline.run(url).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!("Pipeline failed for {url}: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api", get(api))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::collections::HashMap;
    use taglens_core::pipeline::{AcquiredImage, ImageFetcher};
    use taglens_core::sources::{ImageInput, LabelSource};
    use taglens_core::tagging::TagExpander;
    use taglens_core::{LabelSet, PipelineError, PipelineOptions, TagCorpus};
    use tower::ServiceExt;

    struct Fetcher;

    #[async_trait]
    impl ImageFetcher for Fetcher {
        async fn fetch(&self, page_url: &str) -> Result<AcquiredImage, PipelineError> {
            if page_url.contains("missing") {
                return Err(PipelineError::SourceFetchFailed {
                    url: page_url.to_string(),
                    message: "page has no og:image meta tag".into(),
                });
            }
            Ok(AcquiredImage {
                url: "https://cdn.example.com/dog.jpg".into(),
                input: ImageInput::from_bytes(vec![0xFF, 0xD8, 0xFF], "jpeg"),
            })
        }
    }

    struct Labels(&'static str, Vec<(&'static str, f32)>);

    #[async_trait]
    impl LabelSource for Labels {
        fn name(&self) -> &str {
            self.0
        }

        async fn labels(&self, _image: &ImageInput) -> Result<LabelSet, PipelineError> {
            Ok(self.1.iter().copied().collect())
        }
    }

    struct Expander;

    #[async_trait]
    impl TagExpander for Expander {
        async fn expand(&self, tag: &str) -> Result<Vec<String>, PipelineError> {
            let related = HashMap::from([("dog", vec!["puppy", "dogsofinstagram"])]);
            Ok(related
                .get(tag)
                .map(|tags| tags.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default())
        }
    }

    fn state(token: Option<&str>) -> AppState {
        let pipeline = Pipeline::new(
            Box::new(Fetcher),
            vec![
                Box::new(Labels("a", vec![("dog", 0.9), ("grass", 0.5)])),
                Box::new(Labels("b", vec![("dog", 0.8), ("pet", 0.7)])),
            ],
            None,
            Box::new(Expander),
            Some(Arc::new(TagCorpus::from_pairs([
                ("#dog", 300u64),
                ("#puppy", 200),
                ("#pet", 100),
            ]))),
            PipelineOptions::default(),
        );
        AppState::new(Some(pipeline), token.map(String::from), None)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn example() -> Value {
        serde_json::from_str(EXAMPLE_PAYLOAD).unwrap()
    }

    #[tokio::test]
    async fn api_runs_pipeline_when_authorized() {
        let app = build_router(state(Some("s3cret")));
        let (status, body) =
            get_json(app, "/api?url=https%3A%2F%2Fexample.com%2Fp%2F1&password=s3cret").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image"], "https://cdn.example.com/dog.jpg");
        assert_eq!(body["common"], serde_json::json!(["dog"]));
        assert_eq!(body["best"], serde_json::json!(["dog", "pet", "grass"]));
        assert_eq!(
            body["expanded"],
            serde_json::json!(["puppy", "dogsofinstagram"])
        );
        assert_eq!(
            body["most_liked"],
            serde_json::json!({"#dog": 300, "#puppy": 200, "#pet": 100})
        );
        assert_eq!(body["caption"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn api_wrong_password_returns_example() {
        let app = build_router(state(Some("s3cret")));
        let (status, body) = get_json(app, "/api?url=https://example.com&password=nope").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, example());
    }

    #[tokio::test]
    async fn api_missing_url_returns_example() {
        let app = build_router(state(Some("s3cret")));
        let (_, body) = get_json(app, "/api?password=s3cret").await;
        assert_eq!(body, example());
    }

    #[tokio::test]
    async fn api_without_configured_token_never_runs() {
        let app = build_router(state(None));
        let (_, body) = get_json(app, "/api?url=https://example.com&password=").await;
        assert_eq!(body, example());
    }

    #[tokio::test]
    async fn api_without_pipeline_serves_example_to_authorized_callers() {
        let app = build_router(AppState::new(None, Some("s3cret".into()), None));
        let (status, body) = get_json(app, "/api?url=https://example.com&password=s3cret").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, example());
    }

    #[tokio::test]
    async fn api_fatal_error_is_structured() {
        let app = build_router(state(Some("s3cret")));
        let (status, body) =
            get_json(app, "/api?url=https://example.com/missing&password=s3cret").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("no og:image meta tag"));
    }

    #[tokio::test]
    async fn health_reports_version() {
        let app = build_router(state(None));
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], taglens_core::VERSION);
    }

    #[test]
    fn example_payload_has_contract_fields() {
        let example = example();
        for field in ["image", "caption", "common", "best", "expanded", "most_liked"] {
            assert!(example.get(field).is_some(), "missing {field}");
        }
    }
}
