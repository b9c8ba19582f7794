//! Taglens Core - hashtag suggestions for a page's preview image.
//!
//! Taglens fetches the Open Graph image of a URL, asks several image-labeling
//! services what they see, merges their answers, widens the result with
//! related hashtags, and ranks everything by how popular each tag is.
//!
//! # Architecture
//!
//! ```text
//! URL → og:image → {Azure, Google, Rekognition} → Aggregate → Expand → Score → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use taglens_core::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> taglens_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::from_config(&config).await?;
//!
//!     let result = pipeline.run("https://example.com/post/42").await?;
//!     println!("Most liked: {:?}", result.most_liked);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sources;
pub mod tagging;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, Result, TaglensError};
pub use pipeline::{Pipeline, PipelineOptions};
pub use tagging::{CorpusBuilder, FrequencyScorer, LabelAggregator, TagCorpus};
pub use types::{LabelSet, PipelineResult, RankedTag, RankedTagList};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
