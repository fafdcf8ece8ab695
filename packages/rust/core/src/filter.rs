//! Two-tier corpus filtering and final ranking.
//!
//! The pipeline is a fixed sequence of pure steps over the deduplicated
//! corpus: strict tier, fallback to the lenient tier when the strict yield
//! is thin, then rank and truncate.

use std::cmp::Ordering;

use tracing::info;

use litcontext_shared::{FilterThresholds, FilterTier, Paper};

/// Strict yields below this count fall back to the lenient tier.
pub const STRICT_MIN_YIELD: usize = 10;

/// Lenient tier: maximum age in years.
pub const LENIENT_MAX_AGE: i32 = 20;

/// Lenient tier: minimum abstract length in words.
pub const LENIENT_MIN_ABSTRACT_WORDS: usize = 20;

/// Lenient tier: minimum quality score.
pub const LENIENT_MIN_QUALITY: f64 = 1.0;

/// Lenient tier: admission stops at this many papers.
pub const LENIENT_CAP: usize = 20;

/// Output of [`filter_corpus`].
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Ranked corpus, at most `max_papers` long.
    pub papers: Vec<Paper>,
    /// Tier whose output was ranked.
    pub tier: FilterTier,
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Whether a paper passes the configured thresholds.
pub fn passes_strict(paper: &Paper, thresholds: &FilterThresholds, now_year: i32) -> bool {
    paper.citations >= thresholds.min_citations
        && paper.age(now_year) <= thresholds.max_year_range
        && paper.quality_score() >= thresholds.quality_threshold
}

/// Whether a paper passes the relaxed criteria.
pub fn passes_lenient(paper: &Paper, now_year: i32) -> bool {
    paper.age(now_year) <= LENIENT_MAX_AGE
        && paper.abstract_word_count() >= LENIENT_MIN_ABSTRACT_WORDS
        && paper.quality_score() >= LENIENT_MIN_QUALITY
}

/// Papers passing the configured thresholds, in input order.
pub fn strict_tier(papers: &[Paper], thresholds: &FilterThresholds, now_year: i32) -> Vec<Paper> {
    papers
        .iter()
        .filter(|p| passes_strict(p, thresholds, now_year))
        .cloned()
        .collect()
}

/// Papers in descending merit order that pass the relaxed criteria, capped at [`LENIENT_CAP`].
pub fn lenient_tier(papers: &[Paper], now_year: i32) -> Vec<Paper> {
    let mut ordered: Vec<&Paper> = papers.iter().collect();
    ordered.sort_by(|a, b| descending(a.merit(), b.merit()));

    ordered
        .into_iter()
        .filter(|p| passes_lenient(p, now_year))
        .take(LENIENT_CAP)
        .cloned()
        .collect()
}

/// Sort by rank score, highest first, and keep at most `max_papers`.
pub fn rank(mut papers: Vec<Paper>, max_papers: usize) -> Vec<Paper> {
    papers.sort_by(|a, b| descending(a.rank_score(), b.rank_score()));
    papers.truncate(max_papers);
    papers
}

/// Run the strict tier, fall back to the lenient tier if needed, then rank.
pub fn filter_corpus(
    papers: &[Paper],
    thresholds: &FilterThresholds,
    now_year: i32,
) -> FilterOutcome {
    info!(
        min_citations = thresholds.min_citations,
        max_age = thresholds.max_year_range,
        quality_threshold = thresholds.quality_threshold,
        "filtering corpus"
    );

    let strict = strict_tier(papers, thresholds, now_year);
    info!(count = strict.len(), "after strict filtering");

    let (survivors, tier) = if strict.len() < STRICT_MIN_YIELD {
        let lenient = lenient_tier(papers, now_year);
        info!(
            strict = strict.len(),
            lenient = lenient.len(),
            "strict yield too thin, applied lenient filtering"
        );
        (lenient, FilterTier::Lenient)
    } else {
        (strict, FilterTier::Strict)
    };

    let ranked = rank(survivors, thresholds.max_papers);
    info!(count = ranked.len(), %tier, "final filtered corpus");

    FilterOutcome {
        papers: ranked,
        tier,
    }
}

/// Descending comparison; stable sorts keep input order on ties.
fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
