//! Category → collection resolution.
//!
//! The mapping is exhaustive: every [`QueryCategory`] must be registered,
//! checked when the map is built. An individual entry may be empty; that is
//! a degraded condition logged at query time, never a crash.

use std::collections::HashMap;

use tracing::warn;

use glyco_core::config::RetrievalConfig;
use glyco_core::errors::ConfigError;
use glyco_core::models::QueryCategory;
use glyco_core::session::CollectionId;

pub struct CollectionMap {
    entries: HashMap<QueryCategory, Vec<CollectionId>>,
    /// Global priority by registration order; lower index outranks higher
    /// in merge tie-breaks.
    priority: Vec<CollectionId>,
}

impl CollectionMap {
    /// Build from config. Fails startup when any category key is missing.
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        let mut priority = Vec::new();

        for category in QueryCategory::ALL {
            let names = config
                .category_collections
                .get(category.name())
                .ok_or_else(|| ConfigError::MissingCategoryMapping {
                    category: category.name().to_string(),
                })?;
            let ids: Vec<CollectionId> = names.iter().map(|n| CollectionId::new(n)).collect();
            for id in &ids {
                if !priority.contains(id) {
                    priority.push(id.clone());
                }
            }
            entries.insert(category, ids);
        }

        Ok(Self { entries, priority })
    }

    /// Collections registered for a category. Logs when the entry is empty.
    pub fn resolve(&self, category: QueryCategory) -> &[CollectionId] {
        let ids = self
            .entries
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        if ids.is_empty() {
            warn!(category = category.name(), "category resolves to no collections");
        }
        ids
    }

    /// Resolve a set of categories into a deduplicated, priority-ordered
    /// collection list.
    pub fn resolve_all(&self, categories: &[QueryCategory]) -> Vec<CollectionId> {
        let mut out: Vec<CollectionId> = Vec::new();
        for category in categories {
            for id in self.resolve(*category) {
                if !out.contains(id) {
                    out.push(id.clone());
                }
            }
        }
        out.sort_by_key(|id| self.priority_of(id));
        out
    }

    /// Tie-break rank of a collection; unknown collections sort last.
    pub fn priority_of(&self, id: &CollectionId) -> usize {
        self.priority
            .iter()
            .position(|p| p == id)
            .unwrap_or(usize::MAX)
    }
}
