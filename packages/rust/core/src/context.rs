//! Knowledge-context construction: corpus-level statistics, themes,
//! methodologies, trends, and per-paper key findings.
//!
//! The context is what the downstream generation step consumes. It is
//! built once per corpus and not modified afterwards.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use litcontext_shared::Paper;

use crate::findings::extract_key_findings;
use crate::topic::RefinedTopic;
use crate::vocabulary::Vocabulary;

/// Error marker of the degenerate context.
pub const EMPTY_CORPUS_ERROR: &str = "No papers available for context building";

/// Papers at most this many years old count as recent.
pub const RECENT_YEARS: i32 = 3;

/// Quality score at or above which a paper counts as high quality.
pub const HIGH_QUALITY_SCORE: f64 = 4.0;

const MIN_THEME_OCCURRENCES: usize = 2;
const MAX_THEMES: usize = 10;
const MAX_METHODOLOGIES: usize = 8;
const MAX_TRENDS: usize = 5;
const TREND_RATIO: f64 = 1.5;
const MAX_VENUES: usize = 5;
const MAX_AUTHORS: usize = 10;

const DIGEST_FINDINGS: usize = 15;
const DIGEST_THEMES: usize = 5;
const DIGEST_METHODOLOGIES: usize = 5;

const MAX_KEYWORDS: usize = 7;
const KEYWORD_THEMES: usize = 3;
const KEYWORD_METHODOLOGIES: usize = 2;
const TOPIC_ACADEMIC_TERMS: &[&str] = &[
    "research",
    "analysis",
    "study",
    "investigation",
    "evaluation",
];

// ---------------------------------------------------------------------------
// Context types
// ---------------------------------------------------------------------------

/// One extracted finding, attributed to its paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFinding {
    pub text: String,
    /// First author's surname, or `Unknown`.
    pub author: String,
    pub year: i32,
    pub citations: u32,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

/// An emerging term mentioned more often in recent papers than in older ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub term: String,
    pub recent_mentions: usize,
    pub older_mentions: usize,
}

impl TrendSignal {
    pub fn description(&self) -> String {
        format!("Increasing focus on {}", self.term)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitedPaper {
    pub title: String,
    pub year: i32,
    pub citations: u32,
}

/// Papers per citation band: low (<10), medium (10..100), high (>=100).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationDistribution {
    pub low_cited: usize,
    pub medium_cited: usize,
    pub high_cited: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationSummary {
    pub total_citations: u64,
    pub avg_citations: f64,
    pub median_citations: f64,
    pub most_cited: CitedPaper,
    pub distribution: CitationDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSummary {
    /// `"min-max"` publication years.
    pub year_range: String,
    pub recent_papers: usize,
    /// Paper counts keyed by decade label, e.g. `"2010s"`.
    pub by_decade: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCount {
    pub venue: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub total_venues: usize,
    pub top_venues: Vec<VenueCount>,
    /// Distinct venues per paper.
    pub venue_diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub avg_quality_score: f64,
    pub avg_relevance_score: f64,
    pub high_quality_papers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub paper_count: usize,
    pub total_citations: u64,
}

/// Corpus-level summary handed to the generation step.
///
/// Summaries are `None` only in the degenerate context, which is flagged
/// by `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeContext {
    pub total_papers: usize,
    pub key_findings: Vec<KeyFinding>,
    pub common_themes: Vec<ThemeCount>,
    pub methodologies: Vec<String>,
    pub recent_trends: Vec<TrendSignal>,
    pub citation_summary: Option<CitationSummary>,
    pub temporal_summary: Option<TemporalSummary>,
    pub venue_summary: Option<VenueSummary>,
    pub quality_summary: Option<QualitySummary>,
    pub top_authors: Vec<AuthorSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KnowledgeContext {
    /// Context for an empty corpus.
    pub fn degenerate() -> Self {
        Self {
            total_papers: 0,
            key_findings: Vec::new(),
            common_themes: Vec::new(),
            methodologies: Vec::new(),
            recent_trends: Vec::new(),
            citation_summary: None,
            temporal_summary: None,
            venue_summary: None,
            quality_summary: None,
            top_authors: Vec::new(),
            error: Some(EMPTY_CORPUS_ERROR.to_string()),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.error.is_some()
    }

    /// Plain-text research summary for prompting a generator.
    pub fn digest(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Limited research context available. {error}");
        }

        let mut out = String::from("Research Context Summary:\n");
        out.push_str(&format!("- Total Papers Analyzed: {}\n", self.total_papers));

        if let Some(citations) = &self.citation_summary {
            out.push_str("- Citation Statistics:\n");
            out.push_str(&format!("  * Total Citations: {}\n", citations.total_citations));
            out.push_str(&format!("  * Average Citations: {:.1}\n", citations.avg_citations));
            out.push_str(&format!("  * Median Citations: {:.1}\n", citations.median_citations));
        }
        if let Some(temporal) = &self.temporal_summary {
            out.push_str(&format!("- Time Span: {}\n", temporal.year_range));
            out.push_str(&format!(
                "- Recent Research: {} papers from last {RECENT_YEARS} years\n",
                temporal.recent_papers
            ));
        }
        if let Some(quality) = &self.quality_summary {
            out.push_str("- Quality Metrics:\n");
            out.push_str(&format!(
                "  * Average Quality Score: {:.2}\n",
                quality.avg_quality_score
            ));
            out.push_str(&format!(
                "  * High Quality Papers: {}\n",
                quality.high_quality_papers
            ));
        }
        out.push('\n');

        if !self.key_findings.is_empty() {
            out.push_str("Key Research Findings:\n");
            for (i, finding) in self.key_findings.iter().take(DIGEST_FINDINGS).enumerate() {
                out.push_str(&format!(
                    "{}. {} ({}, {})\n",
                    i + 1,
                    finding.text,
                    finding.author,
                    finding.year
                ));
            }
            out.push('\n');
        }

        if !self.common_themes.is_empty() {
            let themes: Vec<String> = self
                .common_themes
                .iter()
                .take(DIGEST_THEMES)
                .map(|t| format!("{} ({} occurrences)", t.theme, t.count))
                .collect();
            out.push_str(&format!("Common Themes: {}\n\n", themes.join(", ")));
        }

        if !self.methodologies.is_empty() {
            let methods: Vec<&str> = self
                .methodologies
                .iter()
                .take(DIGEST_METHODOLOGIES)
                .map(String::as_str)
                .collect();
            out.push_str(&format!("Common Methodologies: {}\n\n", methods.join(", ")));
        }

        if !self.recent_trends.is_empty() {
            let trends: Vec<String> = self
                .recent_trends
                .iter()
                .map(TrendSignal::description)
                .collect();
            out.push_str(&format!("Recent Trends: {}\n\n", trends.join(", ")));
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the knowledge context for a ranked corpus.
///
/// Attaches key findings to every paper as a side effect. An empty corpus
/// yields [`KnowledgeContext::degenerate`].
#[instrument(skip_all, fields(papers = papers.len()))]
pub fn build_knowledge_context(
    papers: &mut [Paper],
    vocabulary: &Vocabulary,
    now: DateTime<Utc>,
) -> KnowledgeContext {
    if papers.is_empty() {
        debug!("empty corpus, returning degenerate context");
        return KnowledgeContext::degenerate();
    }

    let now_year = now.year();
    let mut key_findings = Vec::new();
    for paper in papers.iter_mut() {
        paper.key_findings = extract_key_findings(&paper.abstract_text);
        let author = paper.first_author_surname().to_string();
        key_findings.extend(paper.key_findings.iter().map(|text| KeyFinding {
            text: text.clone(),
            author: author.clone(),
            year: paper.year,
            citations: paper.citations,
            source: paper.source.clone(),
        }));
    }

    let papers: &[Paper] = papers;
    let context = KnowledgeContext {
        total_papers: papers.len(),
        key_findings,
        common_themes: extract_themes(papers, vocabulary.themes()),
        methodologies: extract_methodologies(papers, vocabulary.methodologies()),
        recent_trends: identify_trends(papers, vocabulary.emerging(), now_year),
        citation_summary: summarize_citations(papers),
        temporal_summary: Some(summarize_years(papers, now_year)),
        venue_summary: Some(summarize_venues(papers)),
        quality_summary: Some(summarize_quality(papers)),
        top_authors: top_authors(papers),
        error: None,
    };

    debug!(
        findings = context.key_findings.len(),
        themes = context.common_themes.len(),
        methodologies = context.methodologies.len(),
        trends = context.recent_trends.len(),
        "knowledge context built"
    );
    context
}

/// Theme keywords occurring at least twice in titles and abstracts, most frequent first.
fn extract_themes(papers: &[Paper], themes: &[String]) -> Vec<ThemeCount> {
    let text = corpus_text(papers.iter());
    let mut found: Vec<ThemeCount> = themes
        .iter()
        .map(|theme| ThemeCount {
            theme: theme.clone(),
            count: occurrences(&text, theme),
        })
        .filter(|t| t.count >= MIN_THEME_OCCURRENCES)
        .collect();
    found.sort_by(|a, b| b.count.cmp(&a.count));
    found.truncate(MAX_THEMES);
    found
}

/// Methodology keywords present in any abstract, most frequent first.
fn extract_methodologies(papers: &[Paper], methodologies: &[String]) -> Vec<String> {
    let text = papers
        .iter()
        .map(|p| p.abstract_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut found: Vec<(&String, usize)> = methodologies
        .iter()
        .map(|m| (m, occurrences(&text, m)))
        .filter(|(_, count)| *count > 0)
        .collect();
    found.sort_by(|a, b| b.1.cmp(&a.1));
    found
        .into_iter()
        .take(MAX_METHODOLOGIES)
        .map(|(m, _)| m.clone())
        .collect()
}

/// Emerging terms mentioned more than 1.5x as often in recent papers as in older ones.
fn identify_trends(papers: &[Paper], emerging: &[String], now_year: i32) -> Vec<TrendSignal> {
    let (recent, older): (Vec<&Paper>, Vec<&Paper>) = papers
        .iter()
        .partition(|p| p.age(now_year) <= RECENT_YEARS);
    if recent.is_empty() {
        return Vec::new();
    }

    let recent_text = corpus_text(recent.into_iter());
    let older_text = corpus_text(older.into_iter());

    emerging
        .iter()
        .map(|term| TrendSignal {
            term: term.clone(),
            recent_mentions: occurrences(&recent_text, term),
            older_mentions: occurrences(&older_text, term),
        })
        .filter(|t| t.recent_mentions as f64 > t.older_mentions as f64 * TREND_RATIO)
        .take(MAX_TRENDS)
        .collect()
}

fn summarize_citations(papers: &[Paper]) -> Option<CitationSummary> {
    let most_cited = papers
        .iter()
        .fold(None::<&Paper>, |best, p| match best {
            Some(b) if b.citations >= p.citations => Some(b),
            _ => Some(p),
        })?;

    let mut counts: Vec<u32> = papers.iter().map(|p| p.citations).collect();
    counts.sort_unstable();
    let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
    let mid = counts.len() / 2;
    let median = if counts.len() % 2 == 0 {
        (f64::from(counts[mid - 1]) + f64::from(counts[mid])) / 2.0
    } else {
        f64::from(counts[mid])
    };

    let mut distribution = CitationDistribution::default();
    for &c in &counts {
        match c {
            0..10 => distribution.low_cited += 1,
            10..100 => distribution.medium_cited += 1,
            _ => distribution.high_cited += 1,
        }
    }

    Some(CitationSummary {
        total_citations: total,
        avg_citations: total as f64 / counts.len() as f64,
        median_citations: median,
        most_cited: CitedPaper {
            title: most_cited.title.clone(),
            year: most_cited.year,
            citations: most_cited.citations,
        },
        distribution,
    })
}

fn summarize_years(papers: &[Paper], now_year: i32) -> TemporalSummary {
    let min = papers.iter().map(|p| p.year).min().unwrap_or(now_year);
    let max = papers.iter().map(|p| p.year).max().unwrap_or(now_year);

    let mut by_decade = BTreeMap::new();
    for paper in papers {
        let decade = paper.year.div_euclid(10) * 10;
        *by_decade.entry(format!("{decade}s")).or_insert(0) += 1;
    }

    TemporalSummary {
        year_range: format!("{min}-{max}"),
        recent_papers: papers.iter().filter(|p| p.age(now_year) <= RECENT_YEARS).count(),
        by_decade,
    }
}

fn summarize_venues(papers: &[Paper]) -> VenueSummary {
    let venues = count_first_seen(papers.iter().filter_map(|p| p.venue.as_deref()));
    let total_venues = venues.len();

    VenueSummary {
        total_venues,
        top_venues: venues
            .into_iter()
            .take(MAX_VENUES)
            .map(|(venue, count)| VenueCount {
                venue: venue.to_string(),
                count,
            })
            .collect(),
        venue_diversity: total_venues as f64 / papers.len() as f64,
    }
}

fn summarize_quality(papers: &[Paper]) -> QualitySummary {
    let n = papers.len() as f64;
    QualitySummary {
        avg_quality_score: papers.iter().map(Paper::quality_score).sum::<f64>() / n,
        avg_relevance_score: papers.iter().map(|p| p.relevance_score).sum::<f64>() / n,
        high_quality_papers: papers
            .iter()
            .filter(|p| p.quality_score() >= HIGH_QUALITY_SCORE)
            .count(),
    }
}

fn top_authors(papers: &[Paper]) -> Vec<AuthorSummary> {
    let mut citations: HashMap<&str, u64> = HashMap::new();
    let names = papers.iter().flat_map(|paper| {
        paper
            .authors
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .map(move |name| (name, paper.citations))
    });
    let names: Vec<(&str, u32)> = names.collect();
    for &(name, c) in &names {
        *citations.entry(name).or_insert(0) += u64::from(c);
    }

    count_first_seen(names.iter().map(|(name, _)| *name))
        .into_iter()
        .take(MAX_AUTHORS)
        .map(|(name, paper_count)| AuthorSummary {
            name: name.to_string(),
            paper_count,
            total_citations: citations.get(name).copied().unwrap_or(0),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Keyword suggestions
// ---------------------------------------------------------------------------

/// Up to seven lowercase keywords for the topic, in first-seen order.
///
/// Candidates come from the topic's search terms, the leading themes and
/// methodologies of the context, and academic terms named in the topic.
pub fn suggest_keywords(topic: &RefinedTopic, context: &KnowledgeContext) -> Vec<String> {
    let topic_lower = topic.original.to_lowercase();

    let candidates = topic
        .search_terms
        .iter()
        .map(String::as_str)
        .chain(
            context
                .common_themes
                .iter()
                .take(KEYWORD_THEMES)
                .map(|t| t.theme.as_str()),
        )
        .chain(
            context
                .methodologies
                .iter()
                .take(KEYWORD_METHODOLOGIES)
                .map(String::as_str),
        )
        .chain(
            TOPIC_ACADEMIC_TERMS
                .iter()
                .copied()
                .filter(|term| topic_lower.contains(term)),
        );

    let mut keywords: Vec<String> = Vec::new();
    for candidate in candidates {
        let keyword = candidate.trim().to_lowercase();
        if keyword.split_whitespace().count() > 3 || keyword.chars().count() <= 2 {
            continue;
        }
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercased title and abstract text of the given papers.
fn corpus_text<'a>(papers: impl Iterator<Item = &'a Paper>) -> String {
    papers
        .map(|p| format!("{} {}", p.title, p.abstract_text))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Non-overlapping occurrences of `keyword` (case-insensitive) in lowercased `text`.
fn occurrences(text: &str, keyword: &str) -> usize {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return 0;
    }
    text.matches(keyword.as_str()).count()
}

/// Frequencies in descending order; ties keep first-seen order.
fn count_first_seen<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
