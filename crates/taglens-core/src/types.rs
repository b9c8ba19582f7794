//! Core data types for the Taglens pipeline.
//!
//! These types carry labels from the sources through aggregation and scoring,
//! and represent the final result returned to callers.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Labels produced by one source for one image, with confidence scores.
///
/// Keys are trimmed and lower-cased on insertion. Insertion order is kept so
/// aggregation can break ties by first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    entries: Vec<(String, f32)>,
    index: HashMap<String, usize>,
}

impl LabelSet {
    /// Create an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label. A label already present keeps its position and the
    /// higher of the two scores. Empty labels are ignored.
    pub fn insert(&mut self, label: &str, score: f32) {
        let key = normalize_label(label);
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&i) => {
                if score > self.entries[i].1 {
                    self.entries[i].1 = score;
                }
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, score));
            }
        }
    }

    /// Confidence for a label, if this source produced it.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.index.get(label).map(|&i| self.entries[i].1)
    }

    /// Whether this source produced the label.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// `(label, score)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(label, score)| (label.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f32)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for (label, score) in iter {
            set.insert(label.as_ref(), score);
        }
        set
    }
}

/// Normalize a label to the form used as a `LabelSet` key.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// A tag with its corpus usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTag {
    /// Tag in corpus form, including the leading `#`
    pub tag: String,

    /// Usage count from the corpus
    pub count: u64,
}

/// Tags ordered by score descending, ties in input order.
///
/// Serializes as a JSON object (`{"#tag": count, ...}`) whose keys appear in
/// rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedTagList(pub Vec<RankedTag>);

impl RankedTagList {
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RankedTagList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.tag, &entry.count)?;
        }
        map.end()
    }
}

/// The complete output of one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineResult {
    /// Resolved preview image URL
    pub image: String,

    /// Captions describing the image (empty if the caption source failed)
    pub caption: Vec<String>,

    /// Tags every label source agreed on
    pub common: Vec<String>,

    /// All tags ranked by mean confidence
    pub best: Vec<String>,

    /// Related tags from the expansion service, in seed order
    pub expanded: Vec<String>,

    /// Candidate tags ranked by corpus popularity
    pub most_liked: RankedTagList,

    /// Stages that failed and were recovered from
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
