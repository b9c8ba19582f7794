//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tagging::aggregate::DEFAULT_SEED_LIMIT;
use crate::tagging::expansion::DEFAULT_RELATED_PER_TAG;
use crate::tagging::scorer::DEFAULT_TOP_K;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,

    /// Token required to run the pipeline over HTTP (supports ${ENV_VAR} syntax)
    pub access_token: String,

    /// JSON file served to unauthorized requests (built-in example when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_payload: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4567".to_string(),
            access_token: "${TAGLENS_ACCESS_TOKEN}".to_string(),
            example_payload: None,
        }
    }
}

/// Label and caption source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Label providers queried for every image
    pub enabled: Vec<String>,

    /// Caption provider
    pub caption: String,

    /// Azure Computer Vision configuration
    pub azure: AzureConfig,

    /// Google Cloud Vision configuration
    pub google: GoogleConfig,

    /// AWS Rekognition configuration
    pub rekognition: RekognitionConfig,

    /// Imagga configuration
    pub imagga: ImaggaConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: vec![
                "azure".to_string(),
                "google".to_string(),
                "rekognition".to_string(),
            ],
            caption: "azure".to_string(),
            azure: AzureConfig::default(),
            google: GoogleConfig::default(),
            rekognition: RekognitionConfig::default(),
            imagga: ImaggaConfig::default(),
        }
    }
}

/// Azure Computer Vision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Regional API endpoint
    pub endpoint: String,

    /// Subscription key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://westeurope.api.cognitive.microsoft.com".to_string(),
            api_key: "${AZURE_KEY}".to_string(),
        }
    }
}

/// Google Cloud Vision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Labels and web entities scoring below this are discarded
    pub min_score: f32,

    /// Discard multi-word labels (they never match a hashtag)
    pub single_word_only: bool,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1".to_string(),
            api_key: "${GOOGLE_VISION_KEY}".to_string(),
            min_score: 0.05,
            single_word_only: true,
        }
    }
}

/// AWS Rekognition configuration.
///
/// Credentials are taken from the AWS provider chain, not from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RekognitionConfig {
    /// AWS region (supports ${ENV_VAR} syntax)
    pub region: String,

    /// Upper bound on labels returned per image
    pub max_labels: i32,

    /// Labels below this confidence (0-100) are not returned
    pub min_confidence: f32,
}

impl Default for RekognitionConfig {
    fn default() -> Self {
        Self {
            region: "${AWS_REGION}".to_string(),
            max_labels: 100,
            min_confidence: 50.0,
        }
    }
}

/// Imagga configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImaggaConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// API secret (supports ${ENV_VAR} syntax)
    pub api_secret: String,
}

impl Default for ImaggaConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.imagga.com/v2".to_string(),
            api_key: "${IMAGGA_KEY}".to_string(),
            api_secret: "${IMAGGA_SECRET}".to_string(),
        }
    }
}

/// Related-hashtag expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Relation service base URL; the tag is appended as a path segment
    pub endpoint: String,

    /// Referer header the service expects
    pub referer: String,

    /// Number of aggregated tags used as expansion seeds
    pub seed_limit: usize,

    /// Related tags kept per seed
    pub related_per_tag: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://hashtagify.me/data/tags".to_string(),
            referer: "http://hashtagify.me/hashtag/landscape".to_string(),
            seed_limit: DEFAULT_SEED_LIMIT,
            related_per_tag: DEFAULT_RELATED_PER_TAG,
        }
    }
}

/// Popularity scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Path to the `#tag,count` corpus file
    pub corpus_path: String,

    /// Number of tags kept in the popularity ranking
    pub top_k: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            corpus_path: "~/.taglens/top_tags.txt".to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Network limits. Every outbound call is bounded by one of these timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Page and image download timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Label and caption source timeout in milliseconds
    pub source_timeout_ms: u64,

    /// Per-tag expansion timeout in milliseconds
    pub expansion_timeout_ms: u64,

    /// Maximum preview image size in megabytes
    pub max_image_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            source_timeout_ms: 15_000,
            expansion_timeout_ms: 5_000,
            max_image_size_mb: 10,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
