//! Per-paper quality and relevance heuristics.
//!
//! Both scores are plain arithmetic over a paper's fields. The evaluation
//! instant is always passed in so results are reproducible.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};

use crate::types::Paper;

/// Upper bound of the citation bonus.
const MAX_CITATION_BONUS: f64 = 2.0;

/// Citations needed per point of citation bonus.
const CITATIONS_PER_POINT: f64 = 50.0;

/// Quality score of a paper evaluated at `now`.
///
/// Components: title length, abstract length, capped citation bonus,
/// venue/DOI presence and recency. The maximum attainable score is 7.5.
pub fn quality_score(paper: &Paper, now: DateTime<Utc>) -> f64 {
    let mut score = 0.0;

    let title_words = paper.title_word_count();
    if (5..=20).contains(&title_words) {
        score += 1.0;
    } else if title_words > 0 {
        score += 0.5;
    }

    let abstract_words = paper.abstract_word_count();
    if abstract_words >= 50 {
        score += 2.0;
    } else if abstract_words >= 20 {
        score += 1.0;
    }

    score += (f64::from(paper.citations) / CITATIONS_PER_POINT).min(MAX_CITATION_BONUS);

    if paper.venue.is_some() {
        score += 0.5;
    }
    if paper.doi.is_some() {
        score += 0.5;
    }

    let age = paper.age(now.year());
    if age <= 5 {
        score += 1.0;
    } else if age <= 10 {
        score += 0.5;
    }

    score
}

/// Bag-of-words relevance of a paper to `query`.
///
/// +2.0 per query term found in the title, +0.5 per query term found in the
/// abstract, +5.0 when the whole query appears in the title and +2.0 when it
/// appears in the abstract. Terms are lowercase whitespace tokens; there is
/// no stemming. A blank query scores zero.
pub fn relevance_score(paper: &Paper, query: &str) -> f64 {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return 0.0;
    }

    let query_terms = term_set(&query_lower);
    let title_lower = paper.title.to_lowercase();
    let abstract_lower = paper.abstract_text.to_lowercase();

    let mut score = 0.0;

    let title_terms = term_set(&title_lower);
    score += query_terms.intersection(&title_terms).count() as f64 * 2.0;

    let abstract_terms = term_set(&abstract_lower);
    score += query_terms.intersection(&abstract_terms).count() as f64 * 0.5;

    if title_lower.contains(&query_lower) {
        score += 5.0;
    }
    if abstract_lower.contains(&query_lower) {
        score += 2.0;
    }

    score
}

fn term_set(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::PaperRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn paper(record: PaperRecord) -> Paper {
        Paper::from_record(record, now())
    }

    #[test]
    fn full_marks_paper() {
        let p = paper(PaperRecord {
            title: words(10),
            abstract_text: words(80),
            citations: 120,
            venue: Some("Nature".into()),
            doi: Some("10.1000/xyz".into()),
            year: Some(2025),
            ..Default::default()
        });
        assert!((p.quality_score() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn thin_old_paper() {
        let p = paper(PaperRecord {
            title: words(3),
            abstract_text: words(25),
            citations: 2,
            year: Some(2014),
            ..Default::default()
        });
        // 0.5 title + 1.0 abstract + 0.04 citations, too old for recency
        assert!((p.quality_score() - 1.54).abs() < 1e-9);
    }

    #[test]
    fn citation_bonus_is_capped() {
        let p = paper(PaperRecord {
            citations: 10_000,
            year: Some(1990),
            ..Default::default()
        });
        assert!((p.quality_score() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn recency_bands() {
        let at = |year| {
            paper(PaperRecord {
                year: Some(year),
                ..Default::default()
            })
            .quality_score()
        };
        assert_eq!(at(2021), 1.0);
        assert_eq!(at(2020), 0.5);
        assert_eq!(at(2016), 0.5);
        assert_eq!(at(2015), 0.0);
    }

    #[test]
    fn title_length_bands() {
        let at = |n| {
            paper(PaperRecord {
                title: words(n),
                year: Some(1900),
                ..Default::default()
            })
            .quality_score()
        };
        assert_eq!(at(0), 0.0);
        assert_eq!(at(4), 0.5);
        assert_eq!(at(5), 1.0);
        assert_eq!(at(20), 1.0);
        assert_eq!(at(21), 0.5);
    }

    #[test]
    fn quality_is_deterministic_at_fixed_instant() {
        let p = paper(PaperRecord {
            title: "Federated learning under label skew".into(),
            abstract_text: words(40),
            citations: 33,
            year: Some(2019),
            ..Default::default()
        });
        assert_eq!(quality_score(&p, now()), p.quality_score());
        assert_eq!(quality_score(&p, now()), quality_score(&p, now()));
    }

    #[test]
    fn relevance_term_overlap_and_phrase() {
        let p = paper(PaperRecord {
            title: "Deep learning for protein folding".into(),
            abstract_text: "We apply deep learning to predict structure.".into(),
            ..Default::default()
        });

        // title: deep, learning (+4.0) + phrase (+5.0)
        // abstract: deep, learning (+1.0) + phrase (+2.0)
        assert!((relevance_score(&p, "Deep Learning") - 12.0).abs() < 1e-9);

        // only "protein" overlaps the title
        assert!((relevance_score(&p, "protein design") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn relevance_counts_each_term_once() {
        let p = paper(PaperRecord {
            title: "graph graph graph".into(),
            ..Default::default()
        });
        assert!((relevance_score(&p, "graph graph") - 7.0).abs() < 1e-9);
    }

    #[test]
    fn blank_query_scores_zero() {
        let p = paper(PaperRecord {
            title: "Anything at all".into(),
            abstract_text: "Some text".into(),
            ..Default::default()
        });
        assert_eq!(relevance_score(&p, "   "), 0.0);
    }
}
