use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::constants::{SUFFICIENT_MIN_CHUNKS, SUFFICIENT_MIN_CONFIDENCE};
use crate::session::CollectionId;

/// One retrieved chunk. Ephemeral: lives for the duration of one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub text: String,
    /// Derived from similarity distance; may be raised by personalization.
    pub confidence: Confidence,
    pub collection_id: CollectionId,
    /// True when the collection matches a device registered to the session.
    pub is_user_device: bool,
    /// Raw similarity distance from the vector store (smaller is closer).
    pub distance: f64,
}

/// Qualitative adequacy bucket for a retrieval batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Sufficient,
    Partial,
    Sparse,
}

/// Deterministic summary of a post-boost, post-truncation result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalQuality {
    pub chunk_count: usize,
    pub average_confidence: f64,
    pub distinct_source_count: usize,
    pub coverage: Coverage,
}

impl RetrievalQuality {
    /// Compute quality from a result list.
    ///
    /// Invariant: `Sufficient` iff `chunk_count >= 3 && average_confidence
    /// >= 0.70`; `Sparse` iff `chunk_count == 0`; otherwise `Partial`.
    /// Custom thresholds replace the 3 / 0.70 bounds for cohort overrides.
    pub fn from_results(results: &[RetrievalResult]) -> Self {
        Self::with_thresholds(results, SUFFICIENT_MIN_CHUNKS, SUFFICIENT_MIN_CONFIDENCE)
    }

    pub fn with_thresholds(
        results: &[RetrievalResult],
        min_chunks: usize,
        min_avg_confidence: f64,
    ) -> Self {
        let chunk_count = results.len();
        let average_confidence = if chunk_count == 0 {
            0.0
        } else {
            results.iter().map(|r| r.confidence.value()).sum::<f64>() / chunk_count as f64
        };
        let distinct_source_count = {
            let mut sources: Vec<&CollectionId> = results.iter().map(|r| &r.collection_id).collect();
            sources.sort();
            sources.dedup();
            sources.len()
        };
        let coverage = if chunk_count == 0 {
            Coverage::Sparse
        } else if chunk_count >= min_chunks && average_confidence >= min_avg_confidence {
            Coverage::Sufficient
        } else {
            Coverage::Partial
        };
        Self {
            chunk_count,
            average_confidence,
            distinct_source_count,
            coverage,
        }
    }

    /// Quality of an empty batch.
    pub fn empty() -> Self {
        Self::from_results(&[])
    }
}

/// Why a single collection produced no results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionFailureKind {
    NotFound,
    Timeout,
    Backend,
}

/// A collection that was attempted but returned nothing usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFailure {
    pub collection_id: CollectionId,
    pub kind: CollectionFailureKind,
    pub detail: String,
}

/// Internal observability for one retrieval batch.
/// Never surfaced to the end user directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalDiagnostics {
    pub collections_attempted: usize,
    pub collections_returned: usize,
    pub failures: Vec<CollectionFailure>,
}
