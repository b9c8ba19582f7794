//! Ranking of candidate tags by corpus popularity.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::PipelineError;
use crate::types::{RankedTag, RankedTagList};

use super::corpus::{corpus_key, TagCorpus};

/// Default number of tags kept in the popularity ranking.
pub const DEFAULT_TOP_K: usize = 15;

/// Ranks tags by how often they are used, according to a [`TagCorpus`].
pub struct FrequencyScorer;

impl FrequencyScorer {
    /// Rank `tags` by corpus count, highest first, keeping at most `top_k`.
    ///
    /// Tags are normalized to corpus key form and de-duplicated before
    /// lookup. Tags missing from the corpus are dropped, not scored as zero.
    /// Equal counts keep input order.
    pub fn score<S: AsRef<str>>(
        tags: &[S],
        corpus: Option<&TagCorpus>,
        top_k: usize,
    ) -> Result<RankedTagList, PipelineError> {
        let corpus = match corpus {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(PipelineError::CorpusUnavailable {
                    path: PathBuf::new(),
                    message: "no tag corpus loaded".into(),
                })
            }
        };

        let mut seen = HashSet::new();
        let mut ranked: Vec<RankedTag> = tags
            .iter()
            .map(|t| corpus_key(t.as_ref()))
            .filter(|key| !key.is_empty() && seen.insert(key.clone()))
            .filter_map(|key| {
                let count = corpus.get(&key)?;
                Some(RankedTag { tag: key, count })
            })
            .collect();

        let candidates = ranked.len();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_k);

        tracing::debug!(
            "Scored {} tag(s): {} found in corpus, kept {}",
            tags.len(),
            candidates,
            ranked.len()
        );

        Ok(RankedTagList(ranked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(pairs: &[(&str, u64)]) -> TagCorpus {
        TagCorpus::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_absent_tags_are_dropped() {
        let corpus = corpus(&[("#x", 100), ("#z", 5)]);
        let ranked = FrequencyScorer::score(&["#x", "#y", "#z"], Some(&corpus), 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(
            ranked.0,
            vec![
                RankedTag {
                    tag: "#x".into(),
                    count: 100
                },
                RankedTag {
                    tag: "#z".into(),
                    count: 5
                },
            ]
        );
    }

    #[test]
    fn test_dropping_shrinks_output_below_top_k() {
        let corpus = corpus(&[("#sea", 7)]);
        let ranked = FrequencyScorer::score(&["sky", "sea", "sand"], Some(&corpus), 15).unwrap();
        assert_eq!(ranked.tags().collect::<Vec<_>>(), vec!["#sea"]);
    }

    #[test]
    fn test_plain_labels_are_prefixed_and_deduplicated() {
        let corpus = corpus(&[("#sunset", 40), ("#beach", 90)]);
        let ranked =
            FrequencyScorer::score(&["Sunset", "#sunset", "beach", "sunset"], Some(&corpus), 15)
                .unwrap();
        assert_eq!(ranked.tags().collect::<Vec<_>>(), vec!["#beach", "#sunset"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let corpus = corpus(&[("#b", 10), ("#a", 10), ("#c", 20)]);
        let ranked = FrequencyScorer::score(&["b", "a", "c"], Some(&corpus), 15).unwrap();
        assert_eq!(ranked.tags().collect::<Vec<_>>(), vec!["#c", "#b", "#a"]);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let pairs: Vec<(String, u64)> = (0..30).map(|i| (format!("#t{i}"), i)).collect();
        let corpus = TagCorpus::from_pairs(pairs);
        let tags: Vec<String> = (0..30).map(|i| format!("t{i}")).collect();
        let ranked = FrequencyScorer::score(&tags, Some(&corpus), DEFAULT_TOP_K).unwrap();
        assert_eq!(ranked.len(), DEFAULT_TOP_K);
        assert_eq!(ranked.0[0].tag, "#t29");
    }

    #[test]
    fn test_output_is_subset_of_input_and_corpus() {
        let corpus = corpus(&[("#a", 1), ("#b", 2), ("#zzz", 99)]);
        let input = ["a", "b", "c"];
        let ranked = FrequencyScorer::score(&input, Some(&corpus), 15).unwrap();
        for tag in ranked.tags() {
            assert!(input.iter().any(|t| corpus_key(t) == tag));
            assert!(corpus.get(tag).is_some());
        }
        assert!(!ranked.tags().any(|t| t == "#zzz"));
    }

    #[test]
    fn test_missing_corpus_is_unavailable() {
        let err = FrequencyScorer::score(&["a"], None, 15).unwrap_err();
        assert!(matches!(err, PipelineError::CorpusUnavailable { .. }));

        let empty = TagCorpus::default();
        let err = FrequencyScorer::score(&["a"], Some(&empty), 15).unwrap_err();
        assert!(matches!(err, PipelineError::CorpusUnavailable { .. }));
    }
}
