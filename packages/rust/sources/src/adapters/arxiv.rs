//! arXiv export API adapter.
//!
//! The export API answers with an Atom feed, deserialized with `quick-xml`.
//! Entity and character references and CDATA sections are resolved by the
//! XML reader, so titles come out in the same form other sources report them.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use litcontext_shared::{LitContextError, PaperRecord, Result};

use super::{SourceAdapter, build_client, normalize_base_url};

const ID: &str = "arxiv";
const LABEL: &str = "arXiv";

/// Adapter for `GET /query` on the arXiv export API.
pub struct ArxivAdapter {
    client: Client,
    base_url: String,
    min_abstract_words: usize,
}

impl ArxivAdapter {
    /// Create an adapter against `base_url` (e.g. `https://export.arxiv.org/api`).
    pub fn new(base_url: &str, min_abstract_words: usize, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: normalize_base_url(base_url)?,
            min_abstract_words,
        })
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
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
        let url = format!("{}/query", self.base_url);
        let search_query = format!("all:{query}");
        let max_results = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
            ])
            .send()
            .await
            .map_err(|e| LitContextError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitContextError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LitContextError::Network(format!("{url}: failed to read body: {e}")))?;

        let records = parse_feed(&body)?;
        debug!(records = records.len(), "arxiv feed parsed");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Atom parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "doi", alias = "arxiv:doi", default)]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
    #[serde(rename = "@type", default)]
    mime_type: Option<String>,
}

impl AtomLink {
    fn is_pdf(&self) -> bool {
        self.title.as_deref() == Some("pdf") || self.mime_type.as_deref() == Some("application/pdf")
    }
}

/// Split an Atom feed into per-entry results.
fn parse_feed(xml: &str) -> Result<Vec<Result<PaperRecord>>> {
    if !is_atom_feed(xml) {
        return Err(LitContextError::parse("arxiv: response is not an Atom feed"));
    }

    let feed: AtomFeed = quick_xml::de::from_str(xml)
        .map_err(|e| LitContextError::parse(format!("arxiv: malformed feed: {e}")))?;

    Ok(feed.entries.into_iter().map(parse_entry).collect())
}

/// Whether the document's root element is `<feed>`.
fn is_atom_feed(xml: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return e.local_name().as_ref() == b"feed";
            }
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

/// Map one entry to a record.
fn parse_entry(entry: AtomEntry) -> Result<PaperRecord> {
    let id = normalize_text(&entry.id);
    // The API reports query errors as a pseudo-entry.
    if id.contains("/api/errors") {
        let message = entry
            .summary
            .as_deref()
            .map(normalize_text)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".into());
        return Err(LitContextError::adapter(ID, message));
    }

    let title = entry
        .title
        .as_deref()
        .map(normalize_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LitContextError::validation("arxiv entry has no title"))?;

    let authors = entry
        .authors
        .iter()
        .map(|a| normalize_text(&a.name))
        .filter(|name| !name.is_empty())
        .collect();

    let year = entry
        .published
        .as_deref()
        .and_then(|published| published.trim().get(..4))
        .and_then(|y| y.parse::<i32>().ok());

    let pdf_link = entry
        .links
        .iter()
        .find(|link| link.is_pdf() && !link.href.is_empty())
        .map(|link| link.href.clone());

    Ok(PaperRecord {
        title,
        authors,
        year,
        abstract_text: entry.summary.as_deref().map(normalize_text).unwrap_or_default(),
        url: pdf_link.unwrap_or(id),
        doi: entry.doi.as_deref().map(normalize_text).filter(|d| !d.is_empty()),
        venue: Some(LABEL.to_string()),
        citations: 0,
        source: LABEL.to_string(),
    })
}

/// Collapse whitespace runs (including the feed's hard line wraps) into single spaces.
fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn load_fixture() -> String {
        let path = "../../../fixtures/sources/arxiv_search.xml";
        std::fs::read_to_string(path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn parse_fixture_entries() {
        let records = parse_feed(&load_fixture()).unwrap();
        assert_eq!(records.len(), 4);

        let first = records[0].as_ref().expect("first entry parses");
        assert_eq!(
            first.title,
            "Retrieval-Augmented Generation for Knowledge-Intensive NLP Tasks"
        );
        assert_eq!(first.authors, vec!["Patrick Lewis", "Ethan Perez"]);
        assert_eq!(first.year, Some(2020));
        assert_eq!(first.url, "http://arxiv.org/pdf/2005.11401v4");
        assert_eq!(first.doi.as_deref(), Some("10.5555/3495724.3496517"));
        assert_eq!(first.venue.as_deref(), Some("arXiv"));
        assert_eq!(first.citations, 0);
        assert!(!first.abstract_text.contains('\n'));
        assert!(first.abstract_text.contains("R&D"));

        let second = records[1].as_ref().expect("second entry parses");
        assert!(second.doi.is_none());
        // no pdf link: falls back to the entry id
        assert_eq!(second.url, "http://arxiv.org/abs/2310.06825v1");

        assert!(records[2].is_err());
    }

    #[test]
    fn error_feed_yields_record_error() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;
        let records = parse_feed(xml).unwrap();
        assert_eq!(records.len(), 1);
        let err = records[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("incorrect id format"));
    }

    #[test]
    fn non_atom_body_is_parse_error() {
        assert!(parse_feed("<html><body>maintenance</body></html>").is_err());
    }

    #[test]
    fn character_references_and_cdata_are_resolved() {
        let records = parse_feed(&load_fixture()).unwrap();
        let entry = records[3].as_ref().expect("fourth entry parses");
        assert_eq!(entry.title, "Café models — a study");
        assert_eq!(entry.abstract_text, "Uses <b>bold</b> claims.");
        assert_eq!(entry.authors, vec!["Renée Dupont"]);
        assert_eq!(entry.year, Some(2024));
    }

    #[test]
    fn pdf_link_found_by_mime_type() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/9999.00001v1</id>
    <title>Typed links only</title>
    <link href="http://arxiv.org/abs/9999.00001v1" rel="alternate" type="text/html"/>
    <link href="http://arxiv.org/pdf/9999.00001v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;
        let records = parse_feed(xml).unwrap();
        let entry = records[0].as_ref().unwrap();
        assert_eq!(entry.url, "http://arxiv.org/pdf/9999.00001v1");
        assert!(entry.year.is_none());
        assert!(entry.abstract_text.is_empty());
    }

    #[tokio::test]
    async fn fetch_against_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/query"))
            .and(wiremock::matchers::query_param("search_query", "all:retrieval augmented"))
            .and(wiremock::matchers::query_param("max_results", "10"))
            .and(wiremock::matchers::query_param("sortBy", "relevance"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(load_fixture()))
            .mount(&server)
            .await;

        let adapter = ArxivAdapter::new(&server.uri(), 20, Duration::from_secs(5)).unwrap();
        let papers = adapter.fetch("retrieval augmented", 10, now()).await;

        // second and fourth entries have short abstracts, third is malformed
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].source, "arXiv");
        assert_eq!(papers[0].year, 2020);
    }

    #[tokio::test]
    async fn unavailable_service_yields_empty_list() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/query"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = ArxivAdapter::new(&server.uri(), 0, Duration::from_secs(5)).unwrap();
        assert!(adapter.fetch("anything", 5, now()).await.is_empty());
    }
}
