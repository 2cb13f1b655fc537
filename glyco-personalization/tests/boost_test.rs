use std::sync::Arc;

use glyco_core::config::PersonalizationConfig;
use glyco_core::models::RetrievalResult;
use glyco_core::session::{CollectionId, SessionHash};
use glyco_core::Confidence;
use glyco_personalization::{Feedback, JsonSessionStore, PersonalizationEngine};

fn engine(dir: &std::path::Path) -> PersonalizationEngine {
    PersonalizationEngine::new(
        PersonalizationConfig::default(),
        Arc::new(JsonSessionStore::new(dir)),
    )
}

fn result(collection: &str, confidence: f64) -> RetrievalResult {
    RetrievalResult {
        text: format!("chunk from {collection}"),
        confidence: Confidence::new(confidence),
        collection_id: CollectionId::new(collection),
        is_user_device: false,
        distance: 1.0 - confidence,
    }
}

#[test]
fn first_feedback_moves_by_exactly_base_rate() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s1");
    let collection = CollectionId::new("dexcom_g6_docs");

    let boost = engine
        .record_feedback(&session, &collection, Feedback::Helpful)
        .unwrap();
    let config = PersonalizationConfig::default();
    assert!((boost - config.base_rate).abs() < 1e-12);
}

#[test]
fn learning_rate_decays_with_volume() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s2");
    let collection = CollectionId::new("tslim_x2_manual");
    let config = PersonalizationConfig::default();

    let mut previous = 0.0;
    let mut last_delta = f64::MAX;
    for _ in 0..10 {
        let boost = engine
            .record_feedback(&session, &collection, Feedback::Helpful)
            .unwrap();
        let delta = boost - previous;
        // Each adjustment is no larger than the one before (until the cap
        // bites, where deltas collapse to zero).
        assert!(delta <= last_delta + 1e-12);
        previous = boost;
        last_delta = delta;
    }

    // After 10 helpful events the next adjustment is well under half the
    // base rate: r = base / (1 + 0.2 × 10) = base / 3.
    let before = previous;
    let after = engine
        .record_feedback(&session, &collection, Feedback::NotHelpful)
        .unwrap();
    assert!((before - after).abs() < config.base_rate / 2.0);
}

#[test]
fn boost_never_leaves_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s3");
    let collection = CollectionId::new("omnipod_5_docs");
    let config = PersonalizationConfig::default();

    for _ in 0..50 {
        let boost = engine
            .record_feedback(&session, &collection, Feedback::Helpful)
            .unwrap();
        assert!((0.0..=config.max_boost).contains(&boost));
    }
    for _ in 0..100 {
        let boost = engine
            .record_feedback(&session, &collection, Feedback::NotHelpful)
            .unwrap();
        assert!((0.0..=config.max_boost).contains(&boost));
    }
}

#[test]
fn boost_is_identity_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let results = vec![result("dexcom_g6_docs", 0.7)];
    let boosted = engine.boost(results.clone(), None);
    assert_eq!(boosted[0].confidence, results[0].confidence);
    assert!(!boosted[0].is_user_device);
}

#[test]
fn matching_collection_gets_boost_and_device_flag() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s4");

    engine
        .register_upload(&session, "Dexcom G6 user guide: sensor insertion")
        .unwrap();
    let collection = CollectionId::new("dexcom_g6_docs");
    engine
        .record_feedback(&session, &collection, Feedback::Helpful)
        .unwrap();

    let boosted = engine.boost(
        vec![result("dexcom_g6_docs", 0.7), result("knowledge_base", 0.7)],
        Some(&session),
    );
    assert!(boosted[0].is_user_device);
    assert!(boosted[0].confidence.value() > 0.7);
    assert!(!boosted[1].is_user_device);
    assert_eq!(boosted[1].confidence.value(), 0.7);
}

#[test]
fn boosted_confidence_clamps_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s5");

    engine
        .register_upload(&session, "FreeStyle Libre 3 starter kit")
        .unwrap();
    let collection = CollectionId::new("libre_3_docs");
    for _ in 0..10 {
        engine
            .record_feedback(&session, &collection, Feedback::Helpful)
            .unwrap();
    }

    let boosted = engine.boost(vec![result("libre_3_docs", 0.99)], Some(&session));
    assert!(boosted[0].confidence.value() <= 1.0);
}

#[test]
fn user_correction_beats_auto_detection() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let session = SessionHash::from_raw("s6");

    engine
        .register_upload(&session, "Omnipod 5 getting started")
        .unwrap();
    let profile = engine
        .correct_devices(&session, Some("Tandem t:slim X2".to_string()), None)
        .unwrap();
    assert_eq!(profile.pump.as_deref(), Some("Tandem t:slim X2"));

    // A later upload mentioning another pump must not override the user.
    let profile = engine
        .register_upload(&session, "MiniMed 780G clinician guide")
        .unwrap();
    assert_eq!(profile.pump.as_deref(), Some("Tandem t:slim X2"));
}

#[test]
fn feedback_counts_are_monotonic() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonSessionStore::new(dir.path()));
    let engine = PersonalizationEngine::new(PersonalizationConfig::default(), store.clone());
    let session = SessionHash::from_raw("s7");
    let collection = CollectionId::new("guardian_4_docs");

    use glyco_core::traits::ISessionStore;
    let mut previous = 0;
    for _ in 0..6 {
        engine
            .record_feedback(&session, &collection, Feedback::NotHelpful)
            .unwrap();
        let state = store.load_boosts(&session).unwrap().unwrap();
        let count = state.count_for(&collection);
        assert!(count > previous);
        previous = count;
    }
}
