//! End-to-end aggregation run: sources → dedup → filter → rank.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use litcontext_shared::scoring::relevance_score;
use litcontext_shared::{AggregationConfig, AppConfig, FilterTier, Paper, Result, SearchStats};
use litcontext_sources::{SourceAdapter, SourceRegistry};

use crate::dedup;
use crate::filter::{self, STRICT_MIN_YIELD};

/// Terms kept from the original query on the broadened retry.
const BROADENED_TERMS: usize = 3;

/// Result of one aggregation run.
///
/// An empty `papers` list is a valid outcome; callers should report it as
/// insufficient evidence.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Correlates log lines of one run.
    pub run_id: Uuid,
    /// Query that produced the corpus (the broadened one if the retry ran).
    pub query_used: String,
    pub broadened: bool,
    pub tier: FilterTier,
    /// Ranked, size-bounded corpus.
    pub papers: Vec<Paper>,
    pub stats: SearchStats,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a source has answered (or failed, with `count == 0`).
    fn source_completed(&self, source: &str, count: usize);
    /// Called when the run completes.
    fn done(&self, aggregation: &Aggregation);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_completed(&self, _source: &str, _count: usize) {}
    fn done(&self, _aggregation: &Aggregation) {}
}

/// Fans a query out to every enabled source and reduces the answers to a
/// ranked corpus.
pub struct Aggregator {
    registry: SourceRegistry,
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, config: AggregationConfig) -> Self {
        Self { registry, config }
    }

    /// Build the registry and runtime config from the application config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(registry, AggregationConfig::from(config)))
    }

    /// Run one aggregation without progress reporting.
    pub async fn run(&self, query: &str, now: DateTime<Utc>) -> Aggregation {
        self.run_with_progress(query, now, &SilentProgress).await
    }

    /// Run one aggregation.
    ///
    /// 1. Search every source concurrently
    /// 2. If nothing came back, search once more with a broadened query
    /// 3. Deduplicate
    /// 4. Filter (strict, else lenient) and rank
    ///
    /// Never fails: source failures contribute nothing and an empty corpus
    /// is returned as-is.
    #[instrument(skip_all, fields(query = %query, sources = self.registry.len()))]
    pub async fn run_with_progress(
        &self,
        query: &str,
        now: DateTime<Utc>,
        progress: &dyn ProgressReporter,
    ) -> Aggregation {
        let start = Instant::now();
        let run_id = Uuid::now_v7();
        let limit = self.config.max_results_per_source;

        info!(%run_id, "starting aggregation run");

        // --- Phase 1: Search ---
        progress.phase("Searching sources");
        let mut query_used = query.trim().to_string();
        let (mut corpus, mut by_source) = self.search(&query_used, limit, now, progress).await;
        let mut broadened = false;

        // --- Phase 2: Broadened retry ---
        if corpus.is_empty() && !self.registry.is_empty() {
            let broader = broaden_query(&query_used);
            warn!(%run_id, "no papers found from any source");
            info!(%run_id, query = %broader, limit = limit * 2, "retrying with broader query");

            progress.phase("Broadening search");
            let (papers, counts) = self.search(&broader, limit * 2, now, progress).await;
            corpus = papers;
            by_source = counts;
            query_used = broader;
            broadened = true;
        }

        let total_found = corpus.len();
        info!(%run_id, total_found, "search complete");

        // --- Phase 3: Deduplicate ---
        progress.phase("Deduplicating");
        let deduped = dedup::deduplicate(&corpus);

        // --- Phase 4: Filter and rank ---
        progress.phase("Filtering and ranking");
        let outcome = filter::filter_corpus(&deduped, &self.config.thresholds, now.year());

        let stats = SearchStats {
            total_found,
            after_dedup: deduped.len(),
            after_filtering: outcome.papers.len(),
            by_source,
            broadened,
            tier: outcome.tier,
        };

        let aggregation = Aggregation {
            run_id,
            query_used,
            broadened,
            tier: outcome.tier,
            papers: outcome.papers,
            stats,
        };

        info!(
            %run_id,
            papers = aggregation.papers.len(),
            tier = %aggregation.tier,
            broadened,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "aggregation run complete"
        );
        progress.done(&aggregation);

        aggregation
    }

    /// Query every adapter concurrently, each bounded by the source timeout.
    ///
    /// All tasks are spawned up front and collected in invocation order, so
    /// the merged corpus does not depend on which source answers first.
    /// Papers are scored for relevance against `query`.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        now: DateTime<Utc>,
        progress: &dyn ProgressReporter,
    ) -> (Vec<Paper>, BTreeMap<String, usize>) {
        let adapters = self.registry.adapters();
        let timeout = self.config.source_timeout;

        let handles: Vec<_> = adapters
            .iter()
            .map(|adapter| {
                let adapter: Arc<dyn SourceAdapter> = Arc::clone(adapter);
                let query = query.to_string();
                tokio::spawn(async move {
                    tokio::time::timeout(timeout, adapter.fetch(&query, limit, now)).await
                })
            })
            .collect();

        let mut corpus = Vec::new();
        let mut by_source = BTreeMap::new();

        for (adapter, handle) in adapters.iter().zip(handles) {
            let mut papers = match handle.await {
                Ok(Ok(papers)) => papers,
                Ok(Err(_elapsed)) => {
                    warn!(
                        source = adapter.id(),
                        timeout_secs = timeout.as_secs_f64(),
                        "source timed out"
                    );
                    Vec::new()
                }
                Err(e) => {
                    error!(source = adapter.id(), error = %e, "source task failed");
                    Vec::new()
                }
            };

            for paper in &mut papers {
                paper.relevance_score = relevance_score(paper, query);
            }
            progress.source_completed(adapter.id(), papers.len());
            by_source.insert(adapter.id().to_string(), papers.len());
            corpus.extend(papers);
        }

        (corpus, by_source)
    }
}

/// First three whitespace-delimited terms of `query`.
pub fn broaden_query(query: &str) -> String {
    query
        .split_whitespace()
        .take(BROADENED_TERMS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reporting warnings for a finished run.
pub fn run_warnings(stats: &SearchStats) -> Vec<String> {
    let mut warnings = Vec::new();

    if stats.after_filtering == 0 {
        warnings.push(
            "no papers survived filtering, there is insufficient evidence for this topic".into(),
        );
    } else if stats.after_filtering < STRICT_MIN_YIELD {
        warnings.push(format!(
            "fewer than {STRICT_MIN_YIELD} papers after filtering, consider broader search terms"
        ));
    }
    if stats.broadened {
        warnings.push(
            "the original query found nothing, results come from a broadened query".into(),
        );
    }
    if stats.tier == FilterTier::Lenient && stats.after_filtering > 0 {
        warnings.push("configured quality thresholds were relaxed to fill the corpus".into());
    }

    warnings
}
