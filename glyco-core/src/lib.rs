//! # glyco-core
//!
//! Foundation crate for the Glyco decision engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod confidence;
pub mod constants;
pub mod errors;
pub mod models;
pub mod session;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EngineConfig;
pub use confidence::Confidence;
pub use errors::{GlycoError, GlycoResult};
pub use models::{
    Classification, Coverage, EngineResponse, KnowledgeBreakdown, QueryCategory, RetrievalQuality,
    RetrievalResult, SafetyAuditResult, Verdict,
};
pub use session::{CollectionId, SessionHash};
