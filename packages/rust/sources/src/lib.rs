//! Bibliographic source adapters for LitContext.
//!
//! Each adapter maps one remote search API onto [`litcontext_shared::Paper`].
//! The [`SourceRegistry`] builds the enabled adapters from config, in the
//! order the aggregator invokes them.

pub mod adapters;

pub use adapters::{ArxivAdapter, SemanticScholarAdapter, SourceAdapter, SourceRegistry};
