//! Shared types, scoring, error model, and configuration for LitContext.
//!
//! This crate is the foundation depended on by all other LitContext crates.
//! It provides:
//! - [`LitContextError`]: the unified error type
//! - Domain types ([`Paper`], [`PaperRecord`], [`SearchStats`], [`FilterTier`])
//! - The per-paper scorer ([`scoring`])
//! - Configuration ([`AppConfig`], [`AggregationConfig`], config loading)

pub mod config;
pub mod error;
pub mod scoring;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AggregationConfig, AppConfig, ArxivConfig, FilterThresholds, SUPPORTED_SOURCES, SearchConfig,
    SemanticScholarConfig, UNSUPPORTED_SOURCES, VocabularyConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_search_config,
};
pub use error::{LitContextError, Result};
pub use types::{FilterTier, Paper, PaperRecord, SearchStats};
