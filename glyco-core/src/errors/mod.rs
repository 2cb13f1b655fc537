//! Error taxonomy for the decision engine.
//!
//! Degraded-input conditions (a missing or slow collection) are not errors;
//! they are recorded in diagnostics and shrink the result set. The enums here
//! cover the failures that do propagate: generation exhaustion, persisted
//! state problems, and configuration errors that are fatal at startup.

mod config_error;
mod generation_error;
mod retrieval_error;
mod state_error;

pub use config_error::ConfigError;
pub use generation_error::GenerationError;
pub use retrieval_error::{RetrievalError, VectorStoreError};
pub use state_error::StateError;

/// Top-level error for the Glyco engine.
#[derive(Debug, thiserror::Error)]
pub enum GlycoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across all crates.
pub type GlycoResult<T> = Result<T, GlycoError>;
