use std::sync::Arc;

use glyco_core::config::PersonalizationConfig;
use glyco_core::session::{CollectionId, SessionHash};
use glyco_personalization::{Feedback, JsonSessionStore, PersonalizationEngine};
use proptest::prelude::*;

fn arb_feedback() -> impl Strategy<Value = Feedback> {
    prop_oneof![Just(Feedback::Helpful), Just(Feedback::NotHelpful)]
}

proptest! {
    // Boost bounds hold for any feedback sequence.
    #[test]
    fn boost_stays_in_bounds(events in prop::collection::vec(arb_feedback(), 1..60)) {
        let dir = tempfile::tempdir().unwrap();
        let config = PersonalizationConfig::default();
        let max_boost = config.max_boost;
        let engine = PersonalizationEngine::new(
            config,
            Arc::new(JsonSessionStore::new(dir.path())),
        );
        let session = SessionHash::from_raw("prop-session");
        let collection = CollectionId::new("dexcom_g6_docs");

        for feedback in events {
            let boost = engine
                .record_feedback(&session, &collection, feedback)
                .unwrap();
            prop_assert!(boost >= 0.0);
            prop_assert!(boost <= max_boost + 1e-12);
        }
    }

    // Adjustment magnitude is monotonically non-increasing in feedback
    // volume: |Δ_k| computed from the rate formula, independent of polarity.
    #[test]
    fn rate_decays_monotonically(events in prop::collection::vec(arb_feedback(), 2..40)) {
        let config = PersonalizationConfig::default();
        let mut last_rate = f64::MAX;
        for (n, _) in events.iter().enumerate() {
            let rate = config.base_rate / (1.0 + config.decay_factor * n as f64);
            prop_assert!(rate <= last_rate);
            last_rate = rate;
        }
        // Regularization target: after 10 events the rate is
        // below half the base rate.
        if events.len() > 10 {
            prop_assert!(last_rate < config.base_rate / 2.0);
        }
    }
}
