use serde::{Deserialize, Serialize};

/// Which source dominates the assembled answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySource {
    /// The user's own data answers the query; always wins when available.
    PersonalData,
    Retrieved,
    Hybrid,
    Generated,
}

/// How retrieved and model-generated content are mixed for one answer.
///
/// Invariant: `retrieved_ratio + generated_ratio == 1.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBreakdown {
    pub retrieved_ratio: f64,
    pub generated_ratio: f64,
    pub primary_source_type: PrimarySource,
    /// Ratio-weighted average of retrieval confidence and the fixed
    /// generated-knowledge confidence constant.
    pub blended_confidence: f64,
}

impl KnowledgeBreakdown {
    /// True when any part of the answer leans on uncited model knowledge,
    /// which subjects it to the citation-sufficiency audit check.
    pub fn uses_generated_knowledge(&self) -> bool {
        self.generated_ratio > 0.0
    }
}

/// Cohort-specific replacement for the blending thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdOverride {
    /// Replaces the sufficient-coverage chunk minimum (default 3).
    pub min_chunks: usize,
    /// Replaces the sufficient-coverage confidence minimum (default 0.70).
    pub min_avg_confidence: f64,
    /// When set, the blender never mixes in generated content.
    pub force_retrieved_only: bool,
}
