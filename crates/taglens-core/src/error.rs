//! Error types for the Taglens pipeline.
//!
//! Errors are organized by stage so callers can tell a fatal failure (no image,
//! no labels at all) from one the pipeline recovers from locally (a single
//! label source, one expansion tag, the scoring corpus).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Taglens operations.
#[derive(Error, Debug)]
pub enum TaglensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Aggregation was asked to work on nothing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The page or its preview image could not be retrieved
    #[error("Failed to fetch source image for {url}: {message}")]
    SourceFetchFailed { url: String, message: String },

    /// Every configured label source failed
    #[error("No labels available: all {attempted} label source(s) failed")]
    NoLabelsAvailable { attempted: usize },

    /// A label or caption provider failed
    #[error("{source_name} error: {message}")]
    Source {
        source_name: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The tag relation service could not be reached
    #[error("Expansion service unavailable for '{tag}': {message}")]
    UpstreamUnavailable { tag: String, message: String },

    /// The tag relation service answered with an unexpected shape
    #[error("Malformed expansion response for '{tag}': {message}")]
    MalformedResponse { tag: String, message: String },

    /// The frequency corpus is missing or empty
    #[error("Tag corpus unavailable ({}): {message}", path.display())]
    CorpusUnavailable { path: PathBuf, message: String },
}

impl PipelineError {
    /// Whether the pipeline is allowed to continue after this error.
    ///
    /// Fatal errors abort a run; everything else is recorded as a warning.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceFetchFailed { .. }
                | PipelineError::NoLabelsAvailable { .. }
                | PipelineError::InvalidInput(_)
        )
    }
}

/// Convenience type alias for Taglens results.
pub type Result<T> = std::result::Result<T, TaglensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let fetch = PipelineError::SourceFetchFailed {
            url: "https://example.com".into(),
            message: "404".into(),
        };
        assert!(fetch.is_fatal());
        assert!(PipelineError::NoLabelsAvailable { attempted: 3 }.is_fatal());

        let corpus = PipelineError::CorpusUnavailable {
            path: PathBuf::from("top_tags.txt"),
            message: "missing".into(),
        };
        assert!(!corpus.is_fatal());

        let expansion = PipelineError::MalformedResponse {
            tag: "sky".into(),
            message: "no related_tags".into(),
        };
        assert!(!expansion.is_fatal());
    }

    #[test]
    fn test_source_error_message() {
        let err = PipelineError::Source {
            source_name: "azure".into(),
            message: "HTTP 401".into(),
            status_code: Some(401),
        };
        assert_eq!(err.to_string(), "azure error: HTTP 401");
    }
}
