/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("no collection mapping registered for category {category}")]
    UnmappedCategory { category: String },

    #[error("retrieval worker pool failed: {reason}")]
    PoolFailed { reason: String },
}

/// Errors raised by a vector-store collaborator.
///
/// `CollectionNotFound` and the generic variants are both degraded to empty
/// results by the orchestrator, but they are logged differently.
#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    #[error("search timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("backend failure: {reason}")]
    Backend { reason: String },
}
