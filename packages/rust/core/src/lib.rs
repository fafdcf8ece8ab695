//! Aggregation, ranking and knowledge-context logic for LitContext.
//!
//! This crate ties the source adapters to the corpus pipeline
//! (dedup → filter → rank) and builds the knowledge context consumed by
//! downstream generation.

pub mod context;
pub mod dedup;
pub mod filter;
pub mod findings;
pub mod pipeline;
pub mod topic;
pub mod vocabulary;

pub use context::{KnowledgeContext, build_knowledge_context, suggest_keywords};
pub use filter::{FilterOutcome, filter_corpus};
pub use pipeline::{
    Aggregation, Aggregator, ProgressReporter, SilentProgress, broaden_query, run_warnings,
};
pub use topic::{RefinedTopic, refine_topic};
pub use vocabulary::Vocabulary;
