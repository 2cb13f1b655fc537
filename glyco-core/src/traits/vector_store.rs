use std::collections::HashMap;

use crate::errors::VectorStoreError;
use crate::session::CollectionId;

/// One raw hit from a similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    /// Similarity distance; smaller is closer.
    pub distance: f64,
    pub metadata: HashMap<String, String>,
}

/// Vector similarity store collaborator.
///
/// A missing collection must be reported as
/// [`VectorStoreError::CollectionNotFound`] so the orchestrator can log it
/// apart from generic backend failures; both degrade to empty results.
pub trait IVectorStore: Send + Sync {
    fn search(
        &self,
        collection: &CollectionId,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError>;
}
