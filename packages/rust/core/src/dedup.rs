//! Cross-source deduplication by canonical title.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use litcontext_shared::Paper;

/// Normalize a title into its deduplication key.
///
/// Lowercases, trims, strips every character that is neither a word
/// character nor whitespace, then collapses whitespace runs.
pub fn canonical_title(title: &str) -> String {
    static NON_WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

    let lowered = title.trim().to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a paper carries enough text to be scored at all.
pub fn is_usable(paper: &Paper) -> bool {
    !paper.title.trim().is_empty() && !paper.abstract_text.trim().is_empty()
}

/// Drop unusable papers, then keep the first paper seen for each canonical title.
pub fn deduplicate(papers: &[Paper]) -> Vec<Paper> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(papers.len());
    let mut blank = 0usize;

    for paper in papers {
        if !is_usable(paper) {
            blank += 1;
            continue;
        }
        if seen.insert(canonical_title(&paper.title)) {
            kept.push(paper.clone());
        }
    }

    debug!(
        input = papers.len(),
        kept = kept.len(),
        blank,
        duplicates = papers.len() - blank - kept.len(),
        "deduplicated corpus"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use litcontext_shared::PaperRecord;

    fn paper(title: &str, abstract_text: &str, source: &str) -> Paper {
        Paper::from_record(
            PaperRecord {
                title: title.into(),
                abstract_text: abstract_text.into(),
                source: source.into(),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn punctuation_and_case_collapse() {
        assert_eq!(
            canonical_title("Deep Learning: A Review!"),
            canonical_title("deep learning a review")
        );
        assert_eq!(canonical_title("  Deep   Learning:  A Review "), "deep learning a review");
    }

    #[test]
    fn keeps_first_seen_duplicate() {
        let papers = vec![
            paper("Deep Learning: A Review!", "From the first source.", "Semantic Scholar"),
            paper("deep learning a review", "From the second source.", "arXiv"),
            paper("Something else", "Distinct paper.", "arXiv"),
        ];

        let kept = deduplicate(&papers);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source, "Semantic Scholar");
        assert_eq!(kept[1].title, "Something else");
    }

    #[test]
    fn drops_blank_title_or_abstract() {
        let papers = vec![
            paper("Has no abstract", "", "arXiv"),
            paper("", "Has no title.", "arXiv"),
            paper("Complete", "Has both.", "arXiv"),
        ];
        let kept = deduplicate(&papers);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Complete");
    }

    #[test]
    fn blank_record_does_not_shadow_later_duplicate() {
        let papers = vec![
            paper("Shared Title", "   ", "Semantic Scholar"),
            paper("shared title.", "Usable abstract.", "arXiv"),
        ];
        let kept = deduplicate(&papers);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, "arXiv");
    }

    #[test]
    fn deduplication_is_idempotent() {
        let papers = vec![
            paper("A: B", "x", "s"),
            paper("a b", "y", "s"),
            paper("C", "z", "s"),
            paper("", "w", "s"),
        ];
        let once = deduplicate(&papers);
        let twice = deduplicate(&once);
        let titles = |ps: &[Paper]| ps.iter().map(|p| p.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&once), titles(&twice));
    }
}
