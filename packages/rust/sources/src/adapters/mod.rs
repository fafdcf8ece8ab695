//! Source adapter trait and built-in bibliographic adapters.
//!
//! Each adapter issues its own request and maps the remote records into
//! [`PaperRecord`]s. The provided [`SourceAdapter::fetch`] method is the
//! failure boundary: nothing an adapter does can abort an aggregation run.

mod arxiv;
mod semantic_scholar;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, error, info, warn};

use litcontext_shared::{AppConfig, LitContextError, Paper, PaperRecord, Result};

pub use arxiv::ArxivAdapter;
pub use semantic_scholar::SemanticScholarAdapter;

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("LitContext/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Trait for one bibliographic source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Canonical identifier, as used in config (`semantic_scholar`, `arxiv`).
    fn id(&self) -> &str;

    /// Display label stored in [`Paper::source`].
    fn label(&self) -> &str;

    /// Records with fewer abstract words than this are dropped at the source.
    fn min_abstract_words(&self) -> usize;

    /// Issue the source request.
    ///
    /// The outer `Err` is a whole-request failure; an inner `Err` is one
    /// malformed record.
    async fn query(&self, query: &str, limit: usize) -> Result<Vec<Result<PaperRecord>>>;

    /// Fetch papers for `query`, constructing each one at `now`.
    ///
    /// Never fails: request errors yield an empty list, bad records are
    /// logged and skipped.
    async fn fetch(&self, query: &str, limit: usize, now: DateTime<Utc>) -> Vec<Paper> {
        let records = match self.query(query, limit).await {
            Ok(records) => records,
            Err(e) => {
                error!(source = self.id(), error = %e, "source request failed");
                return Vec::new();
            }
        };

        let min_words = self.min_abstract_words();
        let mut papers = Vec::with_capacity(records.len());
        let mut short_abstracts = 0usize;

        for record in records {
            match record {
                Ok(record) => {
                    if record.abstract_text.split_whitespace().count() < min_words {
                        short_abstracts += 1;
                        continue;
                    }
                    papers.push(Paper::from_record(record, now));
                }
                Err(e) => {
                    warn!(source = self.id(), error = %e, "skipping malformed record");
                }
            }
        }

        if short_abstracts > 0 {
            debug!(
                source = self.id(),
                short_abstracts, min_words, "dropped records with short abstracts"
            );
        }
        info!(
            source = self.id(),
            label = self.label(),
            count = papers.len(),
            "source returned papers"
        );

        papers
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds the enabled adapters in invocation order.
pub struct SourceRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Build adapters for every enabled source in `config.search.search_sources`.
    ///
    /// Unknown or unsupported source names are skipped with a warning.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.search.source_timeout_secs);
        let default_min = config.search.min_abstract_length;
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

        for name in &config.search.search_sources {
            match name.as_str() {
                "semantic_scholar" => {
                    let s2 = &config.semantic_scholar;
                    let api_key = std::env::var(&s2.api_key_env)
                        .ok()
                        .filter(|key| !key.is_empty());
                    let adapter = SemanticScholarAdapter::new(
                        &s2.base_url,
                        api_key,
                        s2.min_abstract_length.unwrap_or(default_min),
                        timeout,
                    )?;
                    adapters.push(Arc::new(adapter));
                }
                "arxiv" => {
                    let adapter = ArxivAdapter::new(
                        &config.arxiv.base_url,
                        config.arxiv.min_abstract_length.unwrap_or(default_min),
                        timeout,
                    )?;
                    adapters.push(Arc::new(adapter));
                }
                other => {
                    warn!(source = other, "no adapter for source, skipping");
                }
            }
        }

        Ok(Self { adapters })
    }

    /// Create a registry from pre-built adapters (custom sources, tests).
    pub fn with_adapters(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Enabled adapters in invocation order.
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with the per-source timeout.
fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(3))
        .timeout(timeout)
        .build()
        .map_err(|e| LitContextError::Network(format!("failed to build HTTP client: {e}")))
}

/// Validate a configured base URL and strip any trailing slash.
fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| LitContextError::config(format!("invalid base URL '{base_url}': {e}")))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct CannedAdapter {
        records: Vec<Result<PaperRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl SourceAdapter for CannedAdapter {
        fn id(&self) -> &str {
            "canned"
        }

        fn label(&self) -> &str {
            "Canned"
        }

        fn min_abstract_words(&self) -> usize {
            3
        }

        async fn query(&self, _query: &str, _limit: usize) -> Result<Vec<Result<PaperRecord>>> {
            if self.fail {
                return Err(LitContextError::Network("connection refused".into()));
            }
            Ok(self
                .records
                .iter()
                .map(|r| match r {
                    Ok(record) => Ok(record.clone()),
                    Err(e) => Err(LitContextError::parse(e.to_string())),
                })
                .collect())
        }
    }

    fn record(title: &str, abstract_text: &str) -> PaperRecord {
        PaperRecord {
            title: title.into(),
            abstract_text: abstract_text.into(),
            source: "Canned".into(),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn fetch_applies_admission_rule_and_skips_bad_records() {
        let adapter = CannedAdapter {
            records: vec![
                Ok(record("Kept paper", "one two three four")),
                Err(LitContextError::parse("missing title")),
                Ok(record("Short abstract", "too short")),
            ],
            fail: false,
        };

        let papers = adapter.fetch("anything", 10, now()).await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Kept paper");
        assert_eq!(papers[0].year, 2026);
    }

    #[tokio::test]
    async fn fetch_swallows_request_failure() {
        let adapter = CannedAdapter {
            records: vec![],
            fail: true,
        };
        assert!(adapter.fetch("anything", 10, now()).await.is_empty());
    }

    #[test]
    fn registry_follows_configured_order_and_skips_unknown() {
        let mut config = AppConfig::default();
        config.search.search_sources = vec![
            "arxiv".into(),
            "google_scholar".into(),
            "semantic_scholar".into(),
        ];
        config.arxiv.min_abstract_length = Some(0);

        let registry = SourceRegistry::from_config(&config).expect("registry");
        let ids: Vec<&str> = registry.adapters().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["arxiv", "semantic_scholar"]);
        assert_eq!(registry.adapters()[0].min_abstract_words(), 0);
        assert_eq!(registry.adapters()[1].min_abstract_words(), 50);
    }

    #[test]
    fn registry_rejects_invalid_base_url() {
        let mut config = AppConfig::default();
        config.arxiv.base_url = "not a url".into();
        assert!(SourceRegistry::from_config(&config).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(
            normalize_base_url("https://api.example.org/graph/v1/").unwrap(),
            "https://api.example.org/graph/v1"
        );
    }
}
