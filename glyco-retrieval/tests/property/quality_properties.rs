use glyco_core::config::BlendConfig;
use glyco_core::models::{Coverage, RetrievalResult};
use glyco_core::session::CollectionId;
use glyco_core::{Confidence, RetrievalQuality};
use glyco_retrieval::KnowledgeBlender;
use proptest::prelude::*;

fn results_from(confidences: &[f64]) -> Vec<RetrievalResult> {
    confidences
        .iter()
        .enumerate()
        .map(|(i, &c)| RetrievalResult {
            text: format!("chunk {i}"),
            confidence: Confidence::new(c),
            collection_id: CollectionId::new("knowledge_base"),
            is_user_device: false,
            distance: 1.0 - c,
        })
        .collect()
}

proptest! {
    // Coverage invariant: sufficient ⟺ chunk_count ≥ 3 ∧ avg ≥ 0.70.
    #[test]
    fn coverage_invariant(confidences in prop::collection::vec(0.0f64..1.0, 0..12)) {
        let results = results_from(&confidences);
        let quality = RetrievalQuality::from_results(&results);

        let avg = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };
        let expect_sufficient = confidences.len() >= 3 && avg >= 0.70;

        prop_assert_eq!(
            quality.coverage == Coverage::Sufficient,
            expect_sufficient
        );
        prop_assert_eq!(quality.coverage == Coverage::Sparse, confidences.is_empty());
    }

    // Ratio invariant: retrieved + generated = 1 for every breakdown,
    // under any personal-data flag.
    #[test]
    fn ratio_invariant(
        confidences in prop::collection::vec(0.0f64..1.0, 0..12),
        personal_data in any::<bool>(),
    ) {
        let blender = KnowledgeBlender::new(BlendConfig::default());
        let quality = RetrievalQuality::from_results(&results_from(&confidences));
        let breakdown = blender.blend(&quality, personal_data, None);

        prop_assert!((breakdown.retrieved_ratio + breakdown.generated_ratio - 1.0).abs() < 1e-9);
        prop_assert!((0.0..=1.0).contains(&breakdown.retrieved_ratio));
        prop_assert!((0.0..=1.0).contains(&breakdown.generated_ratio));
        prop_assert!((0.0..=1.0).contains(&breakdown.blended_confidence));
    }

    // Sparse retrieval always leans on generated knowledge.
    #[test]
    fn sparse_is_mostly_generated(personal_data in Just(false)) {
        let blender = KnowledgeBlender::new(BlendConfig::default());
        let quality = RetrievalQuality::empty();
        let breakdown = blender.blend(&quality, personal_data, None);
        prop_assert!(breakdown.generated_ratio >= 0.7);
    }
}
