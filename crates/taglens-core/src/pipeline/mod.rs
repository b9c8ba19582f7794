//! Pipeline components.
//!
//! - **fetch**: Resolve a page URL to its preview image
//! - **processor**: Orchestrates label collection, aggregation, expansion and scoring

pub mod fetch;
pub mod processor;

// Re-exports for convenient access
pub use fetch::{extract_og_image, AcquiredImage, ImageFetcher, OpenGraphFetcher};
pub use processor::{Pipeline, PipelineOptions};
