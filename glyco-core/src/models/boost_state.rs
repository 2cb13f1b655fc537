use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::{CollectionId, SessionHash};

/// Per-session feedback-learned confidence boosts, one per collection.
///
/// Invariants: every adjustment stays in `[0, max_boost]`; feedback counts
/// are monotonically non-decreasing. Mutated only by feedback events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostAdjustmentState {
    pub session_hash: SessionHash,
    pub source_adjustments: HashMap<CollectionId, f64>,
    pub feedback_count: HashMap<CollectionId, u32>,
    pub updated_at: DateTime<Utc>,
}

impl BoostAdjustmentState {
    pub fn new(session_hash: SessionHash) -> Self {
        Self {
            session_hash,
            source_adjustments: HashMap::new(),
            feedback_count: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Current boost for a collection; zero when never adjusted.
    pub fn boost_for(&self, collection: &CollectionId) -> f64 {
        self.source_adjustments.get(collection).copied().unwrap_or(0.0)
    }

    /// Feedback events recorded so far for a collection.
    pub fn count_for(&self, collection: &CollectionId) -> u32 {
        self.feedback_count.get(collection).copied().unwrap_or(0)
    }
}
