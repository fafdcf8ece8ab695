//! Sentence-level key-finding extraction from abstracts.

use std::sync::LazyLock;

use regex::Regex;

/// Findings kept per paper.
pub const MAX_FINDINGS: usize = 3;

/// Indicator tiers. A sentence earns each tier's weight at most once.
const INDICATOR_TIERS: &[(u32, &[&str])] = &[
    (
        3,
        &["found", "discovered", "revealed", "demonstrated", "concluded", "results show"],
    ),
    (
        2,
        &["showed", "indicated", "suggested", "evidence", "significant", "correlation"],
    ),
    (
        1,
        &["relationship", "effect", "impact", "influence", "associated", "related"],
    ),
];

const STATISTICAL_TERMS: &[&str] = &["p <", "significant", "correlation", "regression"];

/// Tokens ending in a period that do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "al.", "etc.", "fig.", "figs.", "eq.", "vs.", "cf.", "approx.", "no.", "dr.",
    "mr.", "ms.", "prof.",
];

/// Extract up to [`MAX_FINDINGS`] key sentences from an abstract.
///
/// Sentences are scored on finding indicators, quantitative results and
/// statistical vocabulary. When nothing scores, the last one or two
/// sentences are used instead.
pub fn extract_key_findings(abstract_text: &str) -> Vec<String> {
    let sentences = split_sentences(abstract_text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, u32)> = sentences
        .iter()
        .map(|s| (s.as_str(), score_sentence(s)))
        .filter(|(_, score)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    if scored.is_empty() {
        let tail = sentences.len().saturating_sub(2);
        return sentences[tail..].to_vec();
    }

    scored
        .into_iter()
        .take(MAX_FINDINGS)
        .map(|(s, _)| s.to_string())
        .collect()
}

/// Score one sentence.
pub fn score_sentence(sentence: &str) -> u32 {
    static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\d+\.?\d*%|\d+\.?\d*\s*(fold|times|percent)").expect("valid regex")
    });

    let lower = sentence.to_lowercase();
    let mut score = 0;

    for (weight, words) in INDICATOR_TIERS {
        if words.iter().any(|w| lower.contains(w)) {
            score += weight;
        }
    }
    if QUANTITY.is_match(&lower) {
        score += 2;
    }
    if STATISTICAL_TERMS.iter().any(|t| lower.contains(t)) {
        score += 1;
    }
    score
}

/// Split text into trimmed sentences on `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if !at_boundary {
            continue;
        }
        let end = i + c.len_utf8();
        if c == '.' && ends_with_abbreviation(&text[start..end]) {
            continue;
        }
        push_trimmed(&mut sentences, &text[start..end]);
        start = end;
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    fragment
        .split_whitespace()
        .last()
        .map(|word| {
            let word = word.to_lowercase();
            ABBREVIATIONS.contains(&word.as_str())
        })
        .unwrap_or(false)
}

fn push_trimmed(sentences: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
