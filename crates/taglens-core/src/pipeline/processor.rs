//! Pipeline orchestration - wires together all stages.
//!
//! ```text
//! URL → Acquire image → {Label sources ∥ Caption} → Aggregate → Expand → Score → Result
//! ```

use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::sources::{CaptionSource, ImageInput, LabelSource, SourceFactory};
use crate::tagging::aggregate::{seed_from, LabelAggregator};
use crate::tagging::expansion::{expand_all, RelatedTagsClient, TagExpander};
use crate::tagging::{FrequencyScorer, TagCorpus};
use crate::types::{LabelSet, PipelineResult};

use super::fetch::{ImageFetcher, OpenGraphFetcher};

/// Tunables for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of aggregated tags sent to the expansion service
    pub seed_limit: usize,
    /// Number of tags kept in the popularity ranking
    pub top_k: usize,
    /// Timeout for each label/caption source call
    pub source_timeout: Duration,
    /// Timeout for each expansion call
    pub expansion_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        let config = Config::default();
        Self::from_config(&config)
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seed_limit: config.expansion.seed_limit,
            top_k: config.scoring.top_k,
            source_timeout: Duration::from_millis(config.limits.source_timeout_ms),
            expansion_timeout: Duration::from_millis(config.limits.expansion_timeout_ms),
        }
    }
}

/// The tagging pipeline: one instance serves any number of runs.
pub struct Pipeline {
    fetcher: Box<dyn ImageFetcher>,
    sources: Vec<Box<dyn LabelSource>>,
    caption: Option<Box<dyn CaptionSource>>,
    expander: Box<dyn TagExpander>,
    corpus: Option<Arc<TagCorpus>>,
    corpus_path: PathBuf,
    options: PipelineOptions,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        fetcher: Box<dyn ImageFetcher>,
        sources: Vec<Box<dyn LabelSource>>,
        caption: Option<Box<dyn CaptionSource>>,
        expander: Box<dyn TagExpander>,
        corpus: Option<Arc<TagCorpus>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            sources,
            caption,
            expander,
            corpus,
            corpus_path: PathBuf::new(),
            options,
        }
    }

    /// Record where the corpus was (or should have been) loaded from, for
    /// reporting when it is unavailable.
    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = path.into();
        self
    }

    /// Build a pipeline with the providers named in the config.
    ///
    /// Sources whose credentials are missing are skipped with a warning; it
    /// is an error only if no label source is left. A missing corpus is not
    /// an error here: runs report it and return unranked results.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut sources = Vec::new();
        let mut skipped = Vec::new();
        for name in &config.sources.enabled {
            match SourceFactory::label_source(name, &config.sources).await {
                Ok(source) => sources.push(source),
                Err(e) => {
                    tracing::warn!("Label source '{name}' disabled: {e}");
                    skipped.push(e);
                }
            }
        }
        if sources.is_empty() {
            return Err(skipped
                .into_iter()
                .next()
                .unwrap_or(PipelineError::NoLabelsAvailable { attempted: 0 })
                .into());
        }

        let caption = match SourceFactory::caption_source(&config.sources.caption, &config.sources)
        {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!("Caption source disabled: {e}");
                None
            }
        };

        let corpus_path = config.corpus_path();
        let corpus = match TagCorpus::load(&corpus_path) {
            Ok(corpus) if !corpus.is_empty() => Some(Arc::new(corpus)),
            Ok(_) => {
                tracing::warn!("Tag corpus at {:?} is empty", corpus_path);
                None
            }
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        };

        tracing::info!(
            "Pipeline ready: {} label source(s), caption {}, corpus {}",
            sources.len(),
            if caption.is_some() { "on" } else { "off" },
            corpus.as_ref().map_or(0, |c| c.len()),
        );

        Ok(Self::new(
            Box::new(OpenGraphFetcher::new(&config.limits)),
            sources,
            caption,
            Box::new(RelatedTagsClient::new(&config.expansion)),
            corpus,
            PipelineOptions::from_config(config),
        )
        .with_corpus_path(corpus_path))
    }

    /// The loaded corpus, if any.
    pub fn corpus(&self) -> Option<&TagCorpus> {
        self.corpus.as_deref()
    }

    /// Run the full pipeline for a page URL.
    pub async fn run(&self, page_url: &str) -> Result<PipelineResult> {
        let start = Instant::now();
        tracing::debug!("Processing: {page_url}");

        let image = self.fetcher.fetch(page_url).await?;
        tracing::trace!("  Acquire: {:?}", start.elapsed());

        let result = self.run_with_image(&image.url, &image.input).await?;
        tracing::debug!("Processed {page_url} in {:?}", start.elapsed());
        Ok(result)
    }

    /// Run every stage after image acquisition.
    pub async fn run_with_image(
        &self,
        image_url: &str,
        image: &ImageInput,
    ) -> Result<PipelineResult> {
        let mut warnings = Vec::new();

        // Label sources and the caption source run concurrently
        let collect_start = Instant::now();
        let (label_results, caption_result) =
            tokio::join!(self.collect_labels(image), self.fetch_caption(image));
        tracing::trace!("  Labels + caption: {:?}", collect_start.elapsed());

        let mut label_sets = Vec::with_capacity(label_results.len());
        for (name, result) in label_results {
            match result {
                Ok(set) => {
                    tracing::debug!("  {name}: {} label(s)", set.len());
                    label_sets.push(set);
                }
                Err(e) => {
                    tracing::warn!("Label source '{name}' failed: {e}");
                    warnings.push(e.to_string());
                }
            }
        }
        if label_sets.is_empty() {
            return Err(PipelineError::NoLabelsAvailable {
                attempted: self.sources.len(),
            }
            .into());
        }

        let caption = match caption_result {
            Some(Ok(captions)) => captions,
            Some(Err(e)) => {
                tracing::warn!("Caption source failed: {e}");
                warnings.push(e.to_string());
                Vec::new()
            }
            None => Vec::new(),
        };

        // Aggregate
        let aggregator = LabelAggregator::new(&label_sets)?;
        let common = aggregator.common_tags();
        let best = aggregator.best_tags();
        let seed = seed_from(&common, &best, self.options.seed_limit);
        tracing::debug!("  Seed tags: {:?}", seed);

        // Expand
        let expand_start = Instant::now();
        let expansion =
            expand_all(self.expander.as_ref(), &seed, self.options.expansion_timeout).await;
        warnings.extend(expansion.failures.iter().map(|e| e.to_string()));
        let expanded = expansion.tags;
        tracing::trace!("  Expand: {:?}", expand_start.elapsed());

        // Score
        let candidates: Vec<&String> = common.iter().chain(&best).chain(&expanded).collect();
        let most_liked =
            match FrequencyScorer::score(&candidates, self.corpus.as_deref(), self.options.top_k) {
                Ok(ranked) => ranked,
                Err(PipelineError::CorpusUnavailable { message, .. }) => {
                    let e = PipelineError::CorpusUnavailable {
                        path: self.corpus_path.clone(),
                        message,
                    };
                    tracing::warn!("Skipping popularity ranking: {e}");
                    warnings.push(e.to_string());
                    Default::default()
                }
                Err(e) => {
                    tracing::warn!("Skipping popularity ranking: {e}");
                    warnings.push(e.to_string());
                    Default::default()
                }
            };

        Ok(PipelineResult {
            image: image_url.to_string(),
            caption,
            common,
            best,
            expanded,
            most_liked,
            warnings,
        })
    }

    /// Query every label source, each bounded by the source timeout.
    ///
    /// Results come back in source order, paired with the source name.
    async fn collect_labels(
        &self,
        image: &ImageInput,
    ) -> Vec<(String, std::result::Result<LabelSet, PipelineError>)> {
        let timeout = self.options.source_timeout;
        let calls = self.sources.iter().map(|source| async move {
            let result = match tokio::time::timeout(timeout, source.labels(image)).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Timeout {
                    stage: format!("label source '{}'", source.name()),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            (source.name().to_string(), result)
        });
        join_all(calls).await
    }

    async fn fetch_caption(
        &self,
        image: &ImageInput,
    ) -> Option<std::result::Result<Vec<String>, PipelineError>> {
        let source = self.caption.as_ref()?;
        let timeout = self.options.source_timeout;
        Some(
            match tokio::time::timeout(timeout, source.captions(image)).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Timeout {
                    stage: format!("caption source '{}'", source.name()),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            },
        )
    }
}
