use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants;
use crate::errors::ConfigError;
use crate::models::QueryCategory;

/// Retrieval orchestrator configuration, including the category → collection
/// mapping. Keys are `QueryCategory::name()` strings so the mapping can be
/// written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Results kept after merge, boost, and truncation.
    pub top_k: usize,
    /// Per-collection hits requested from the vector store.
    pub per_collection_k: usize,
    /// Bounded worker count for the parallel fan-out.
    pub max_parallel_fetches: usize,
    /// Per-collection call timeout.
    pub collection_timeout_ms: u64,
    /// Exhaustive category → collections mapping. An entry may be empty
    /// (zero results, logged); a missing entry fails startup validation.
    pub category_collections: HashMap<String, Vec<String>>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let mut category_collections = HashMap::new();
        category_collections.insert(
            QueryCategory::ClinicalGuidelines.name().to_string(),
            vec!["clinical_guidelines".to_string()],
        );
        category_collections.insert(
            QueryCategory::UserSources.name().to_string(),
            vec!["user_sources".to_string()],
        );
        category_collections.insert(
            QueryCategory::KnowledgeBase.name().to_string(),
            vec!["knowledge_base".to_string()],
        );
        category_collections.insert(
            QueryCategory::PersonalData.name().to_string(),
            vec!["personal_data".to_string()],
        );
        // Hybrid fans out through its secondary categories; Unknown falls
        // back to the general knowledge base.
        category_collections.insert(QueryCategory::Hybrid.name().to_string(), Vec::new());
        category_collections.insert(
            QueryCategory::Unknown.name().to_string(),
            vec!["knowledge_base".to_string()],
        );

        Self {
            top_k: constants::DEFAULT_TOP_K,
            per_collection_k: constants::DEFAULT_TOP_K,
            max_parallel_fetches: constants::DEFAULT_MAX_PARALLEL_FETCHES,
            collection_timeout_ms: constants::DEFAULT_COLLECTION_TIMEOUT_MS,
            category_collections,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "retrieval.top_k".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_parallel_fetches == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "retrieval.max_parallel_fetches".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.collection_timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "retrieval.collection_timeout_ms".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
