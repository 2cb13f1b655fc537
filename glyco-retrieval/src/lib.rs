//! # glyco-retrieval
//!
//! Fans a query out to one or more named collections on a bounded worker
//! pool, merges and deduplicates the results, summarizes their adequacy as a
//! [`glyco_core::RetrievalQuality`], and blends retrieved versus generated
//! knowledge into a [`glyco_core::KnowledgeBreakdown`].

mod blend;
mod collection_map;
mod orchestrator;

pub use blend::KnowledgeBlender;
pub use collection_map::CollectionMap;
pub use orchestrator::RetrievalOrchestrator;
