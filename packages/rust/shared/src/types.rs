//! Core domain types for LitContext corpora.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring;

// ---------------------------------------------------------------------------
// PaperRecord
// ---------------------------------------------------------------------------

/// One remote record after source-specific field mapping, before scoring.
///
/// Adapters produce these; [`Paper::from_record`] turns them into the
/// canonical shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperRecord {
    pub title: String,
    /// Author names in authorship order.
    pub authors: Vec<String>,
    /// Publication year, `None` when the source does not know it.
    pub year: Option<i32>,
    pub abstract_text: String,
    pub url: String,
    pub doi: Option<String>,
    pub venue: Option<String>,
    pub citations: u32,
    /// Display label of the adapter that produced the record.
    pub source: String,
}

// ---------------------------------------------------------------------------
// Paper
// ---------------------------------------------------------------------------

/// Canonical record for one publication.
///
/// The quality score is fixed when the paper is constructed and is only
/// readable afterwards. Relevance and key findings are the two fields the
/// pipeline assigns later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    /// Publication year. Unknown years are recorded as the construction year.
    pub year: i32,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub citations: u32,
    /// Which adapter produced this paper.
    pub source: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub relevance_score: f64,
    quality_score: f64,
}

impl Paper {
    /// Build a paper from a mapped record, scoring its quality against `now`.
    ///
    /// Blank DOI/venue strings are treated as absent so they never earn the
    /// metadata bonus.
    pub fn from_record(record: PaperRecord, now: DateTime<Utc>) -> Self {
        let mut paper = Self {
            title: record.title.trim().to_string(),
            authors: record.authors,
            year: record.year.unwrap_or_else(|| now.year()),
            abstract_text: record.abstract_text,
            url: record.url,
            doi: non_blank(record.doi),
            venue: non_blank(record.venue),
            citations: record.citations,
            source: record.source,
            key_findings: Vec::new(),
            relevance_score: 0.0,
            quality_score: 0.0,
        };
        paper.quality_score = scoring::quality_score(&paper, now);
        paper
    }

    /// Quality score computed at construction time.
    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    /// Years elapsed between publication and `now_year`.
    pub fn age(&self, now_year: i32) -> i32 {
        now_year.saturating_sub(self.year)
    }

    /// Number of whitespace-delimited words in the abstract.
    pub fn abstract_word_count(&self) -> usize {
        self.abstract_text.split_whitespace().count()
    }

    /// Number of whitespace-delimited words in the title.
    pub fn title_word_count(&self) -> usize {
        self.title.split_whitespace().count()
    }

    /// Quality plus relevance, the ordering key of the lenient tier.
    pub fn merit(&self) -> f64 {
        self.quality_score + self.relevance_score
    }

    /// Final ranking key: merit plus a small citation term.
    pub fn rank_score(&self) -> f64 {
        self.merit() + f64::from(self.citations) / 100.0
    }

    /// Last name of the first author, or `"Unknown"`.
    pub fn first_author_surname(&self) -> &str {
        self.authors
            .first()
            .and_then(|name| name.split_whitespace().last())
            .unwrap_or("Unknown")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// FilterTier
// ---------------------------------------------------------------------------

/// Which filtering policy produced the final corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTier {
    /// Configured thresholds held and yielded enough papers.
    #[default]
    Strict,
    /// Strict yield was too thin; relaxed criteria were applied instead.
    Lenient,
}

impl fmt::Display for FilterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchStats
// ---------------------------------------------------------------------------

/// Counters describing one aggregation run. Reporting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Papers returned by all adapters, before deduplication.
    pub total_found: usize,
    /// Papers left after dropping blanks and duplicate titles.
    pub after_dedup: usize,
    /// Papers in the final ranked corpus.
    pub after_filtering: usize,
    /// Papers returned per source identifier.
    pub by_source: BTreeMap<String, usize>,
    /// Whether the broadened-query retry ran.
    pub broadened: bool,
    /// Filtering tier that produced the corpus.
    pub tier: FilterTier,
}
