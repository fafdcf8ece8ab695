//! Topic refinement: academic title, research questions and search terms.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Topic words that already frame the title academically.
const ACADEMIC_KEYWORDS: &[&str] = &[
    "impact",
    "effect",
    "analysis",
    "study",
    "review",
    "comparison",
    "evaluation",
    "assessment",
    "investigation",
    "exploration",
    "relationship",
    "role",
    "influence",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

const QUESTION_WORDS: &[&str] = &["how", "why", "what", "when", "where"];

/// Generic terms appended to every search-term list.
const GENERIC_TERMS: &[&str] = &["research", "study", "analysis", "review"];

/// Search terms kept per topic.
pub const MAX_SEARCH_TERMS: usize = 8;

/// A free-text topic turned into a research framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedTopic {
    /// Topic as given, trimmed.
    pub original: String,
    pub title: String,
    pub research_question: String,
    pub alternative_questions: Vec<String>,
    /// Lowercase search terms, at most [`MAX_SEARCH_TERMS`].
    pub search_terms: Vec<String>,
}

impl RefinedTopic {
    /// Search terms joined into one aggregation query.
    pub fn query(&self) -> String {
        self.search_terms.join(" ")
    }
}

/// Refine a topic string.
pub fn refine_topic(topic: &str) -> RefinedTopic {
    let topic = topic.trim();
    let words = word_tokens(topic);
    let has = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));

    let mut title = title_case(topic);
    if !ACADEMIC_KEYWORDS.iter().any(|k| topic.to_lowercase().contains(k)) {
        let prefix = if has(&["and", "vs"]) {
            "Comparative Analysis of"
        } else if has(QUESTION_WORDS) {
            "An Investigation into"
        } else {
            "A Comprehensive Analysis of"
        };
        title = format!("{prefix} {title}");
    }

    RefinedTopic {
        original: topic.to_string(),
        title,
        research_question: format!("What are the key aspects and implications of {topic}?"),
        alternative_questions: vec![
            format!("How does {topic} impact current research and practice?"),
            format!("What are the main findings in recent literature regarding {topic}?"),
        ],
        search_terms: search_terms(&words),
    }
}

fn search_terms(words: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = words
        .iter()
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(&w.as_str()))
        .cloned()
        .collect();

    for generic in GENERIC_TERMS {
        if !terms.iter().any(|t| t == generic) {
            terms.push((*generic).to_string());
        }
    }
    terms.truncate(MAX_SEARCH_TERMS);
    terms
}

/// Lowercase `\w+` tokens in order.
fn word_tokens(text: &str) -> Vec<String> {
    static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

    let lower = text.to_lowercase();
    WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_topic_gets_comprehensive_prefix() {
        let refined = refine_topic("  microplastics in coastal sediments ");
        assert_eq!(refined.original, "microplastics in coastal sediments");
        assert_eq!(
            refined.title,
            "A Comprehensive Analysis of Microplastics In Coastal Sediments"
        );
        assert_eq!(
            refined.research_question,
            "What are the key aspects and implications of microplastics in coastal sediments?"
        );
        assert_eq!(refined.alternative_questions.len(), 2);
    }

    #[test]
    fn conjunction_gets_comparative_prefix() {
        let refined = refine_topic("solar vs wind power");
        assert_eq!(refined.title, "Comparative Analysis of Solar Vs Wind Power");

        let refined = refine_topic("sleep and memory");
        assert!(refined.title.starts_with("Comparative Analysis of"));
    }

    #[test]
    fn question_gets_investigation_prefix() {
        let refined = refine_topic("why do bees swarm");
        assert_eq!(refined.title, "An Investigation into Why Do Bees Swarm");
    }

    #[test]
    fn academic_keyword_suppresses_prefix() {
        let refined = refine_topic("impact of remote work on productivity");
        assert_eq!(refined.title, "Impact Of Remote Work On Productivity");
    }

    #[test]
    fn search_terms_drop_stopwords_and_short_words() {
        let refined = refine_topic("The role of AI in medical diagnosis");
        assert_eq!(
            refined.search_terms,
            vec!["role", "medical", "diagnosis", "research", "study", "analysis", "review"]
        );
        assert_eq!(refined.query(), "role medical diagnosis research study analysis review");
    }

    #[test]
    fn search_terms_are_capped_and_not_duplicated() {
        let refined = refine_topic(
            "systematic review of transformer architectures for protein structure prediction accuracy",
        );
        assert_eq!(refined.search_terms.len(), MAX_SEARCH_TERMS);
        assert_eq!(refined.search_terms[0], "systematic");
        assert_eq!(
            refined.search_terms.iter().filter(|t| *t == "review").count(),
            1
        );
    }
}
