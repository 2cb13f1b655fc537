//! KnowledgeBlender: decides how retrieved and generated content mix.

use tracing::debug;

use glyco_core::config::BlendConfig;
use glyco_core::models::{Coverage, KnowledgeBreakdown, PrimarySource, ThresholdOverride};
use glyco_core::RetrievalQuality;

pub struct KnowledgeBlender {
    config: BlendConfig,
}

impl KnowledgeBlender {
    pub fn new(config: BlendConfig) -> Self {
        Self { config }
    }

    /// The decision table.
    ///
    /// Personal data, when available and relevant, takes precedence over
    /// every retrieval signal. A cohort override may replace the sufficiency
    /// thresholds and may force retrieval-only operation.
    pub fn blend(
        &self,
        quality: &RetrievalQuality,
        personal_data_available: bool,
        cohort_override: Option<ThresholdOverride>,
    ) -> KnowledgeBreakdown {
        let min_chunks = cohort_override
            .map(|o| o.min_chunks)
            .unwrap_or(self.config.sufficient_min_chunks);
        let min_confidence = cohort_override
            .map(|o| o.min_avg_confidence)
            .unwrap_or(self.config.sufficient_min_confidence);
        let force_retrieved_only = cohort_override
            .map(|o| o.force_retrieved_only)
            .unwrap_or(false);

        // Coverage under the effective thresholds. Sparse stays sparse
        // regardless of overrides: there is nothing to retrieve from.
        let coverage = if quality.chunk_count == 0 {
            Coverage::Sparse
        } else if quality.chunk_count >= min_chunks
            && quality.average_confidence >= min_confidence
        {
            Coverage::Sufficient
        } else {
            Coverage::Partial
        };

        let breakdown = if personal_data_available {
            self.finish(1.0, PrimarySource::PersonalData, quality)
        } else if force_retrieved_only && coverage != Coverage::Sparse {
            self.finish(1.0, PrimarySource::Retrieved, quality)
        } else {
            match coverage {
                Coverage::Sufficient => self.finish(1.0, PrimarySource::Retrieved, quality),
                Coverage::Sparse => self.finish(
                    1.0 - self.config.sparse_generated_ratio,
                    PrimarySource::Generated,
                    quality,
                ),
                Coverage::Partial => {
                    let retrieved = ((quality.chunk_count as f64 / min_chunks as f64)
                        * (quality.average_confidence / min_confidence))
                        .clamp(0.0, 1.0);
                    self.finish(retrieved, PrimarySource::Hybrid, quality)
                }
            }
        };

        debug!(
            retrieved = breakdown.retrieved_ratio,
            generated = breakdown.generated_ratio,
            primary = ?breakdown.primary_source_type,
            blended = breakdown.blended_confidence,
            "blended knowledge sources"
        );
        breakdown
    }

    fn finish(
        &self,
        retrieved_ratio: f64,
        primary_source_type: PrimarySource,
        quality: &RetrievalQuality,
    ) -> KnowledgeBreakdown {
        let generated_ratio = 1.0 - retrieved_ratio;
        let blended_confidence = retrieved_ratio * quality.average_confidence
            + generated_ratio * self.config.generated_knowledge_confidence;
        KnowledgeBreakdown {
            retrieved_ratio,
            generated_ratio,
            primary_source_type,
            blended_confidence,
        }
    }
}
