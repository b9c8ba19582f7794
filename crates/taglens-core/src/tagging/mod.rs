//! Tag aggregation, expansion and popularity ranking.
//!
//! Label sets from several sources are merged into consensus views, a few
//! top tags are expanded through a related-hashtags service, and the final
//! candidates are ranked against a usage-count corpus.

pub mod aggregate;
pub mod corpus;
pub mod expansion;
pub mod scorer;

pub use aggregate::LabelAggregator;
pub use corpus::{CorpusBuilder, TagCorpus};
pub use expansion::{expand_all, Expansion, RelatedTagsClient, TagExpander};
pub use scorer::FrequencyScorer;
