//! Keyword vocabulary driving theme, methodology and trend detection.

use litcontext_shared::VocabularyConfig;

/// What a vocabulary keyword is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Theme,
    Methodology,
    Emerging,
}

/// Built-in keyword table. A keyword may appear under more than one category.
const BUILTIN: &[(&str, Category)] = &[
    ("machine learning", Category::Theme),
    ("artificial intelligence", Category::Theme),
    ("deep learning", Category::Theme),
    ("neural networks", Category::Theme),
    ("climate change", Category::Theme),
    ("sustainability", Category::Theme),
    ("renewable energy", Category::Theme),
    ("carbon", Category::Theme),
    ("healthcare", Category::Theme),
    ("medical", Category::Theme),
    ("treatment", Category::Theme),
    ("therapy", Category::Theme),
    ("diagnosis", Category::Theme),
    ("education", Category::Theme),
    ("learning", Category::Theme),
    ("teaching", Category::Theme),
    ("student", Category::Theme),
    ("performance", Category::Theme),
    ("social", Category::Theme),
    ("economic", Category::Theme),
    ("policy", Category::Theme),
    ("government", Category::Theme),
    ("public", Category::Theme),
    ("data", Category::Theme),
    ("analysis", Category::Theme),
    ("model", Category::Theme),
    ("algorithm", Category::Theme),
    ("framework", Category::Theme),
    ("systematic review", Category::Methodology),
    ("meta-analysis", Category::Methodology),
    ("randomized controlled trial", Category::Methodology),
    ("survey", Category::Methodology),
    ("interview", Category::Methodology),
    ("case study", Category::Methodology),
    ("experimental", Category::Methodology),
    ("longitudinal", Category::Methodology),
    ("cross-sectional", Category::Methodology),
    ("qualitative", Category::Methodology),
    ("quantitative", Category::Methodology),
    ("mixed methods", Category::Methodology),
    ("regression analysis", Category::Methodology),
    ("statistical analysis", Category::Methodology),
    ("content analysis", Category::Methodology),
    ("AI", Category::Emerging),
    ("machine learning", Category::Emerging),
    ("deep learning", Category::Emerging),
    ("blockchain", Category::Emerging),
    ("IoT", Category::Emerging),
    ("sustainability", Category::Emerging),
    ("climate", Category::Emerging),
    ("digital transformation", Category::Emerging),
    ("remote", Category::Emerging),
];

/// Resolved keyword lists, in reporting order.
///
/// Keywords keep their display casing; matching is done on the lowercase form.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    themes: Vec<String>,
    methodologies: Vec<String>,
    emerging: Vec<String>,
}

impl Vocabulary {
    /// The built-in English keyword lists.
    pub fn builtin() -> Self {
        Self {
            themes: builtin_list(Category::Theme),
            methodologies: builtin_list(Category::Methodology),
            emerging: builtin_list(Category::Emerging),
        }
    }

    /// Built-in lists with any configured list replacing its counterpart.
    pub fn from_config(config: Option<&VocabularyConfig>) -> Self {
        let mut vocabulary = Self::builtin();
        let Some(config) = config else {
            return vocabulary;
        };

        if let Some(themes) = &config.themes {
            vocabulary.themes = clean(themes);
        }
        if let Some(methodologies) = &config.methodologies {
            vocabulary.methodologies = clean(methodologies);
        }
        if let Some(emerging) = &config.emerging {
            vocabulary.emerging = clean(emerging);
        }
        vocabulary
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn methodologies(&self) -> &[String] {
        &self.methodologies
    }

    pub fn emerging(&self) -> &[String] {
        &self.emerging
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_list(category: Category) -> Vec<String> {
    BUILTIN
        .iter()
        .filter(|(_, c)| *c == category)
        .map(|(keyword, _)| (*keyword).to_string())
        .collect()
}

fn clean(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_have_expected_sizes() {
        let vocabulary = Vocabulary::builtin();
        assert_eq!(vocabulary.themes().len(), 28);
        assert_eq!(vocabulary.methodologies().len(), 15);
        assert_eq!(vocabulary.emerging().len(), 9);
        assert_eq!(vocabulary.themes()[0], "machine learning");
        assert_eq!(vocabulary.emerging()[0], "AI");
    }

    #[test]
    fn shared_keywords_appear_in_both_categories() {
        let vocabulary = Vocabulary::builtin();
        assert!(vocabulary.themes().iter().any(|k| k == "deep learning"));
        assert!(vocabulary.emerging().iter().any(|k| k == "deep learning"));
    }

    #[test]
    fn configured_lists_replace_builtin() {
        let config = VocabularyConfig {
            themes: Some(vec!["graph".into(), "  ".into(), " protein folding ".into()]),
            methodologies: None,
            emerging: Some(vec![]),
        };
        let vocabulary = Vocabulary::from_config(Some(&config));
        assert_eq!(vocabulary.themes(), ["graph", "protein folding"]);
        assert_eq!(vocabulary.methodologies().len(), 15);
        assert!(vocabulary.emerging().is_empty());
    }

    #[test]
    fn missing_config_is_builtin() {
        assert_eq!(Vocabulary::from_config(None), Vocabulary::builtin());
    }
}
