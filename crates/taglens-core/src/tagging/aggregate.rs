//! Merging of label sets produced by independent label sources.
//!
//! Sources disagree on which labels they return and on their confidences.
//! The aggregator exposes two views over them: the labels every source agrees
//! on, and all labels ranked by mean confidence. Confidences from different
//! sources are averaged as-is; their scales are assumed to be comparable.

use std::collections::{HashMap, HashSet};

use crate::error::PipelineError;
use crate::types::LabelSet;

/// Default number of seed tags handed to the expansion service.
pub const DEFAULT_SEED_LIMIT: usize = 4;

/// Agreement and consensus views over N label sets.
#[derive(Debug, Clone)]
pub struct LabelAggregator<'a> {
    sets: Vec<&'a LabelSet>,
}

impl<'a> LabelAggregator<'a> {
    /// Create an aggregator over the given label sets.
    ///
    /// Empty sets (a source that found nothing) are skipped so they do not
    /// wipe out the intersection. Fails if no sets are given at all.
    pub fn new(sets: &'a [LabelSet]) -> Result<Self, PipelineError> {
        if sets.is_empty() {
            return Err(PipelineError::InvalidInput(
                "at least one label set is required for aggregation".into(),
            ));
        }
        Ok(Self {
            sets: sets.iter().filter(|s| !s.is_empty()).collect(),
        })
    }

    /// Labels present in every non-empty set, in the order of the first set.
    pub fn common_tags(&self) -> Vec<String> {
        let Some((first, rest)) = self.sets.split_first() else {
            return Vec::new();
        };
        first
            .labels()
            .filter(|label| rest.iter().all(|set| set.contains(label)))
            .map(String::from)
            .collect()
    }

    /// Every label with its mean confidence over the sets that contain it,
    /// highest first. Ties keep first-seen order across sources.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, (f64, u32)> = HashMap::new();

        for set in &self.sets {
            for (label, score) in set.iter() {
                let entry = totals.entry(label).or_insert_with(|| {
                    order.push(label);
                    (0.0, 0)
                });
                entry.0 += f64::from(score);
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<(String, f64)> = order
            .into_iter()
            .map(|label| {
                let (sum, n) = totals[label];
                (label.to_string(), sum / f64::from(n))
            })
            .collect();

        // sort_by is stable, so equal means stay in first-seen order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// All labels ranked by mean confidence, highest first.
    pub fn best_tags(&self) -> Vec<String> {
        self.ranked().into_iter().map(|(label, _)| label).collect()
    }

    /// Common tags followed by best tags, de-duplicated, truncated to `limit`.
    pub fn expansion_seed(&self, limit: usize) -> Vec<String> {
        seed_from(&self.common_tags(), &self.best_tags(), limit)
    }
}

/// Build the expansion seed from already-computed common and best tags.
pub fn seed_from(common: &[String], best: &[String], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    common
        .iter()
        .chain(best)
        .filter(|tag| seen.insert(tag.as_str()))
        .take(limit)
        .cloned()
        .collect()
}
