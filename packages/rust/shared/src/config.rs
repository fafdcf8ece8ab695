//! Application configuration for LitContext.
//!
//! User config lives at `~/.litcontext/litcontext.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LitContextError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "litcontext.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".litcontext";

/// Source identifiers this build has adapters for.
pub const SUPPORTED_SOURCES: &[&str] = &["semantic_scholar", "arxiv"];

/// Source identifiers that are recognised but have no adapter.
pub const UNSUPPORTED_SOURCES: &[&str] = &["google_scholar"];

// ---------------------------------------------------------------------------
// Config structs (matching litcontext.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Corpus search and filtering settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Semantic Scholar adapter settings.
    #[serde(default)]
    pub semantic_scholar: SemanticScholarConfig,

    /// arXiv adapter settings.
    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Keyword lists overriding the built-in vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<VocabularyConfig>,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on the final corpus size.
    #[serde(default = "default_max_papers")]
    pub max_papers: usize,

    /// Strict tier: minimum citation count.
    #[serde(default)]
    pub min_citation_count: u32,

    /// Strict tier: maximum age in years.
    #[serde(default = "default_max_year_range")]
    pub max_year_range: i32,

    /// Strict tier: minimum quality score.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Minimum abstract length (words) a source record needs to be admitted.
    #[serde(default = "default_min_abstract_length")]
    pub min_abstract_length: usize,

    /// Enabled sources, queried in this order.
    #[serde(default = "default_search_sources")]
    pub search_sources: Vec<String>,

    /// Records requested from each source.
    #[serde(default = "default_max_results_per_source")]
    pub max_results_per_source: usize,

    /// Upper bound on a single source call, in seconds.
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_papers: default_max_papers(),
            min_citation_count: 0,
            max_year_range: default_max_year_range(),
            quality_threshold: default_quality_threshold(),
            min_abstract_length: default_min_abstract_length(),
            search_sources: default_search_sources(),
            max_results_per_source: default_max_results_per_source(),
            source_timeout_secs: default_source_timeout_secs(),
        }
    }
}

fn default_max_papers() -> usize {
    25
}
fn default_max_year_range() -> i32 {
    15
}
fn default_quality_threshold() -> f64 {
    2.0
}
fn default_min_abstract_length() -> usize {
    50
}
fn default_search_sources() -> Vec<String> {
    vec!["semantic_scholar".into(), "arxiv".into()]
}
fn default_max_results_per_source() -> usize {
    15
}
fn default_source_timeout_secs() -> u64 {
    30
}

/// `[semantic_scholar]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticScholarConfig {
    /// Graph API base URL.
    #[serde(default = "default_semantic_scholar_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_semantic_scholar_key_env")]
    pub api_key_env: String,

    /// Per-source override of `search.min_abstract_length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_abstract_length: Option<usize>,
}

impl Default for SemanticScholarConfig {
    fn default() -> Self {
        Self {
            base_url: default_semantic_scholar_url(),
            api_key_env: default_semantic_scholar_key_env(),
            min_abstract_length: None,
        }
    }
}

fn default_semantic_scholar_url() -> String {
    "https://api.semanticscholar.org/graph/v1".into()
}
fn default_semantic_scholar_key_env() -> String {
    "SEMANTIC_SCHOLAR_API_KEY".into()
}

/// `[arxiv]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    /// Export API base URL.
    #[serde(default = "default_arxiv_url")]
    pub base_url: String,

    /// Per-source override of `search.min_abstract_length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_abstract_length: Option<usize>,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: default_arxiv_url(),
            min_abstract_length: None,
        }
    }
}

fn default_arxiv_url() -> String {
    "https://export.arxiv.org/api".into()
}

/// `[vocabulary]` section. Each list present replaces the built-in one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodologies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emerging: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Aggregation config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Strict-tier thresholds and corpus bound used by the filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterThresholds {
    pub min_citations: u32,
    pub max_year_range: i32,
    pub quality_threshold: f64,
    pub max_papers: usize,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        let search = SearchConfig::default();
        Self {
            min_citations: search.min_citation_count,
            max_year_range: search.max_year_range,
            quality_threshold: search.quality_threshold,
            max_papers: search.max_papers,
        }
    }
}

/// Runtime aggregation configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Filtering thresholds.
    pub thresholds: FilterThresholds,
    /// Records requested from each source on the first attempt.
    pub max_results_per_source: usize,
    /// Upper bound on a single source call.
    pub source_timeout: Duration,
}

impl From<&AppConfig> for AggregationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            thresholds: FilterThresholds {
                min_citations: config.search.min_citation_count,
                max_year_range: config.search.max_year_range,
                quality_threshold: config.search.quality_threshold,
                max_papers: config.search.max_papers,
            },
            max_results_per_source: config.search.max_results_per_source,
            source_timeout: Duration::from_secs(config.search.source_timeout_secs),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.litcontext/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LitContextError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.litcontext/litcontext.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LitContextError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LitContextError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LitContextError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LitContextError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LitContextError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Non-fatal problems with the search settings, for the caller to log.
pub fn validate_search_config(config: &SearchConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.max_papers < 5 {
        warnings.push(format!(
            "max_papers is very low ({}), the corpus may be too thin to summarize",
            config.max_papers
        ));
    }

    if config.search_sources.is_empty() {
        warnings.push("no search sources enabled, every run will return an empty corpus".into());
    }

    for source in &config.search_sources {
        if UNSUPPORTED_SOURCES.contains(&source.as_str()) {
            warnings.push(format!("source '{source}' is not supported and will be skipped"));
        } else if !SUPPORTED_SOURCES.contains(&source.as_str()) {
            warnings.push(format!("unknown source '{source}' will be skipped"));
        }
    }

    warnings
}
