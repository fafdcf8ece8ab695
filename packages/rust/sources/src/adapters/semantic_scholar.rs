//! Semantic Scholar graph API adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use litcontext_shared::{LitContextError, PaperRecord, Result};

use super::{SourceAdapter, build_client, normalize_base_url};

/// Fields requested from `/paper/search`.
const SEARCH_FIELDS: &str = "title,authors,year,abstract,url,citationCount,venue,externalIds";

const ID: &str = "semantic_scholar";
const LABEL: &str = "Semantic Scholar";

/// Adapter for `GET /paper/search` on the Semantic Scholar graph API.
pub struct SemanticScholarAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    min_abstract_words: usize,
}

impl SemanticScholarAdapter {
    /// Create an adapter against `base_url` (e.g. `https://api.semanticscholar.org/graph/v1`).
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        min_abstract_words: usize,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: normalize_base_url(base_url)?,
            api_key,
            min_abstract_words,
        })
    }
}

#[async_trait]
impl SourceAdapter for SemanticScholarAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn label(&self) -> &str {
        LABEL
    }

    fn min_abstract_words(&self) -> usize {
        self.min_abstract_words
    }

    #[instrument(skip_all, fields(source = ID, query = %query, limit))]
    async fn query(&self, query: &str, limit: usize) -> Result<Vec<Result<PaperRecord>>> {
        let url = format!("{}/paper/search", self.base_url);
        let limit_param = limit.to_string();

        let mut request = self.client.get(&url).query(&[
            ("query", query),
            ("limit", limit_param.as_str()),
            ("fields", SEARCH_FIELDS),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LitContextError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitContextError::Network(format!("{url}: HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LitContextError::parse(format!("{url}: invalid JSON: {e}")))?;

        let records = parse_search_response(&body)?;
        debug!(records = records.len(), "semantic scholar response parsed");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    year: Option<i32>,
    r#abstract: Option<String>,
    url: Option<String>,
    citation_count: Option<u32>,
    venue: Option<String>,
    external_ids: Option<S2ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

/// Split a `/paper/search` body into per-record results.
///
/// A body without `data` means no matches. Each element of `data` is
/// decoded on its own so one malformed entry does not sink the rest.
fn parse_search_response(body: &serde_json::Value) -> Result<Vec<Result<PaperRecord>>> {
    let Some(data) = body.get("data") else {
        return Ok(Vec::new());
    };
    let items = data
        .as_array()
        .ok_or_else(|| LitContextError::parse("semantic scholar: `data` is not an array"))?;

    Ok(items.iter().map(parse_record).collect())
}

fn parse_record(item: &serde_json::Value) -> Result<PaperRecord> {
    let paper: S2Paper = serde_json::from_value(item.clone())
        .map_err(|e| LitContextError::parse(format!("semantic scholar record: {e}")))?;

    let title = paper
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LitContextError::validation("semantic scholar record has no title"))?;

    let authors = paper
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.name)
        .filter(|name| !name.trim().is_empty())
        .collect();

    Ok(PaperRecord {
        title,
        authors,
        year: paper.year,
        abstract_text: paper.r#abstract.unwrap_or_default(),
        url: paper.url.unwrap_or_default(),
        doi: paper.external_ids.and_then(|ids| ids.doi),
        venue: paper.venue,
        citations: paper.citation_count.unwrap_or(0),
        source: LABEL.to_string(),
    })
}
