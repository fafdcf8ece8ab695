//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use litcontext_core::pipeline::{Aggregation, Aggregator, ProgressReporter, run_warnings};
use litcontext_core::{
    KnowledgeContext, RefinedTopic, Vocabulary, build_knowledge_context, refine_topic,
    suggest_keywords,
};
use litcontext_shared::{
    AppConfig, Paper, SearchStats, init_config, load_config, load_config_from,
    validate_search_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LitContext: ranked research corpora for a topic.
#[derive(Parser)]
#[command(
    name = "litcontext",
    version,
    about = "Aggregate, rank and summarize research papers for a topic.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search sources for a topic and summarize the ranked corpus.
    Search(SearchArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
pub(crate) struct SearchArgs {
    /// Research topic, in plain words.
    pub topic: String,

    /// Upper bound on the final corpus size.
    #[arg(long)]
    pub max_papers: Option<usize>,

    /// Sources to query, comma-separated (semantic_scholar, arxiv).
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Strict tier: minimum citation count.
    #[arg(long)]
    pub min_citations: Option<u32>,

    /// Write topic, corpus, context and stats as JSON to this path.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Config file to use instead of ~/.litcontext/litcontext.toml.
    #[arg(long, env = "LITCONTEXT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "litcontext=info",
        1 => "litcontext=debug",
        _ => "litcontext=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Search(args) => cmd_search(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

async fn cmd_search(args: SearchArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    apply_overrides(&mut config, &args);

    for warning in validate_search_config(&config.search) {
        warn!(%warning, "config");
    }

    let refined = refine_topic(&args.topic);
    if refined.original.is_empty() {
        return Err(eyre!("topic must not be empty"));
    }
    let query = refined.query();

    info!(
        topic = %refined.original,
        %query,
        sources = ?config.search.search_sources,
        max_papers = config.search.max_papers,
        "searching"
    );

    let aggregator = Aggregator::from_config(&config)?;
    let now = Utc::now();

    let reporter = CliProgress::new();
    let Aggregation {
        mut papers,
        stats,
        query_used,
        run_id,
        ..
    } = aggregator.run_with_progress(&query, now, &reporter).await;

    let vocabulary = Vocabulary::from_config(config.vocabulary.as_ref());
    let context = build_knowledge_context(&mut papers, &vocabulary, now);
    let keywords = suggest_keywords(&refined, &context);
    let warnings = run_warnings(&stats);

    print_report(&refined, &query_used, &papers, &stats, &context, &keywords, &warnings);

    if let Some(path) = &args.json {
        write_json(path, &refined, &query_used, &papers, &context, &stats)?;
        println!("  JSON written to {}", path.display());
    }

    info!(%run_id, papers = papers.len(), "search finished");
    Ok(())
}

/// CLI flags take precedence over the config file.
fn apply_overrides(config: &mut AppConfig, args: &SearchArgs) {
    if let Some(max) = args.max_papers {
        config.search.max_papers = max;
    }
    if let Some(min) = args.min_citations {
        config.search.min_citation_count = min;
    }
    if let Some(sources) = &args.sources {
        config.search.search_sources = sources
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn print_report(
    topic: &RefinedTopic,
    query: &str,
    papers: &[Paper],
    stats: &SearchStats,
    context: &KnowledgeContext,
    keywords: &[String],
    warnings: &[String],
) {
    println!();
    println!("  {}", topic.title);
    println!("  {}", topic.research_question);
    println!("  Query: {query}");
    println!();

    if papers.is_empty() {
        println!("  Insufficient evidence: no papers matched this topic.");
        println!("  Try broader or different search terms.");
        println!();
    } else {
        for (i, paper) in papers.iter().enumerate() {
            println!(
                "  {:>2}. {} ({}, {})",
                i + 1,
                paper.title,
                paper.first_author_surname(),
                paper.year
            );
            println!(
                "      {} · {} citations · quality {:.2} · relevance {:.2}",
                paper.source,
                paper.citations,
                paper.quality_score(),
                paper.relevance_score
            );
        }
        println!();
    }

    println!("  Found:     {}", stats.total_found);
    println!("  Unique:    {}", stats.after_dedup);
    println!("  Kept:      {} ({} tier)", stats.after_filtering, stats.tier);
    for (source, count) in &stats.by_source {
        println!("    {source}: {count}");
    }
    println!();

    if !keywords.is_empty() {
        println!("  Keywords: {}", keywords.join(", "));
        println!();
    }
    for warning in warnings {
        println!("  warning: {warning}");
    }
    if !warnings.is_empty() {
        println!();
    }

    println!("{}", context.digest());
}

fn write_json(
    path: &Path,
    topic: &RefinedTopic,
    query: &str,
    papers: &[Paper],
    context: &KnowledgeContext,
    stats: &SearchStats,
) -> Result<()> {
    let document = serde_json::json!({
        "topic": topic,
        "query": query,
        "papers": papers,
        "context": context,
        "stats": stats,
    });
    let content = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, content).map_err(|e| eyre!("cannot write {}: {e}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_completed(&self, source: &str, count: usize) {
        self.spinner
            .set_message(format!("{source}: {count} papers"));
    }

    fn done(&self, _aggregation: &Aggregation) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flags_parse() {
        let cli = Cli::try_parse_from([
            "litcontext",
            "search",
            "sleep and memory",
            "--max-papers",
            "10",
            "--sources",
            "arxiv,semantic_scholar",
            "--min-citations",
            "5",
        ])
        .expect("parse");

        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.topic, "sleep and memory");
        assert_eq!(args.max_papers, Some(10));
        assert_eq!(
            args.sources,
            Some(vec!["arxiv".to_string(), "semantic_scholar".to_string()])
        );

        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.search.max_papers, 10);
        assert_eq!(config.search.min_citation_count, 5);
        assert_eq!(config.search.search_sources, vec!["arxiv", "semantic_scholar"]);
    }

    #[test]
    fn json_document_has_expected_shape() {
        let dir = std::env::temp_dir().join(format!("litcontext-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.json");

        let topic = refine_topic("coral reef bleaching");
        let context = KnowledgeContext::degenerate();
        write_json(&path, &topic, "coral reef", &[], &context, &SearchStats::default()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["query"], "coral reef");
        assert_eq!(value["topic"]["original"], "coral reef bleaching");
        assert!(value["papers"].as_array().unwrap().is_empty());
        assert_eq!(value["context"]["total_papers"], 0);
        assert_eq!(value["stats"]["tier"], "strict");

        std::fs::remove_dir_all(&dir).ok();
    }
}
