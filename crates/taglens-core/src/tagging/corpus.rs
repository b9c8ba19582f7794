//! The hashtag popularity corpus used for final ranking.
//!
//! The corpus is a plain text file with one `#tag,count` pair per line. It is
//! produced offline (see [`CorpusBuilder`]) and loaded read-only.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::PipelineError;

/// Marker character that prefixes every corpus key.
pub const HASHTAG_MARKER: char = '#';

/// Normalize a tag to corpus key form: lower-cased, whitespace removed,
/// prefixed with a single `#`.
pub fn corpus_key(tag: &str) -> String {
    let body: String = tag
        .trim()
        .trim_start_matches(HASHTAG_MARKER)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if body.is_empty() {
        return String::new();
    }
    format!("{HASHTAG_MARKER}{body}")
}

/// Read-only mapping from hashtag to usage count.
#[derive(Debug, Clone, Default)]
pub struct TagCorpus {
    counts: HashMap<String, u64>,
}

impl TagCorpus {
    /// Load a corpus from a `tag,count` file.
    ///
    /// Malformed lines are skipped. A duplicate tag keeps its largest count.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::CorpusUnavailable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let corpus = Self::parse(&content);
        tracing::info!("Loaded tag corpus: {} tags from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    /// Parse corpus text already in memory.
    pub fn parse(content: &str) -> Self {
        let mut skipped = 0usize;
        let pairs = content.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let parsed = line
                .rsplit_once(',')
                .and_then(|(tag, count)| Some((tag, count.trim().parse::<u64>().ok()?)));
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        });
        let corpus = Self::from_pairs(pairs);
        if skipped > 0 {
            tracing::debug!("Skipped {skipped} malformed corpus line(s)");
        }
        corpus
    }

    /// Build a corpus from `(tag, count)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut counts = HashMap::new();
        for (tag, count) in pairs {
            let key = corpus_key(tag.as_ref());
            if key.is_empty() {
                continue;
            }
            let entry = counts.entry(key).or_insert(0);
            if count > *entry {
                *entry = count;
            }
        }
        Self { counts }
    }

    /// Usage count for a tag already in corpus key form.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Parse an abbreviated count as shown on hashtag listing sites.
///
/// `"1.2M"` → 1_200_000. Values without a `K`, `M` or `B` suffix are rejected;
/// listings only abbreviate counts large enough to be worth keeping.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let multiplier = match raw.chars().last()? {
        'K' | 'k' => 1_000.0,
        'M' | 'm' => 1_000_000.0,
        'B' | 'b' => 1_000_000_000.0,
        _ => return None,
    };
    let number: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = number.parse().ok()?;
    Some((value * multiplier).round() as u64)
}

/// Offline producer of corpus files from scraped listing rows.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    counts: HashMap<String, u64>,
    rejected: usize,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one scraped row: a tag and its abbreviated count (e.g. `"4.1M"`).
    ///
    /// Returns false if the row was rejected.
    pub fn add_row(&mut self, tag: &str, raw_count: &str) -> bool {
        let key = corpus_key(tag);
        match parse_count(raw_count) {
            Some(count) if !key.is_empty() => {
                let entry = self.counts.entry(key).or_insert(0);
                *entry = (*entry).max(count);
                true
            }
            _ => {
                self.rejected += 1;
                false
            }
        }
    }

    /// Add every `tag,count` row of scraped CSV text. Returns rows accepted.
    pub fn add_csv(&mut self, content: &str) -> usize {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| match line.split_once(',') {
                Some((tag, count)) => self.add_row(tag, count),
                None => {
                    self.rejected += 1;
                    false
                }
            })
            .count()
    }

    /// Number of rows rejected so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Write the corpus file, most popular tags first.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let mut rows: Vec<(&String, &u64)> = self.counts.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (tag, count) in rows {
            writeln!(writer, "{tag},{count}")?;
        }
        writer.flush()
    }

    /// Consume the builder into an in-memory corpus.
    pub fn build(self) -> TagCorpus {
        TagCorpus {
            counts: self.counts,
        }
    }
}
