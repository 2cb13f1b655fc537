//! Full-pipeline tests against in-memory fakes.

use std::fs;
use std::sync::Arc;

use glyco_core::models::{PrimarySource, QueryCategory, Verdict, ViolationKind};
use glyco_core::traits::{IGenerativeModel, SearchHit};
use glyco_core::{constants, EngineConfig, SessionHash};
use glyco_engine::GlycoEngine;
use glyco_experiments::JsonlAuditSink;
use glyco_personalization::JsonSessionStore;
use test_fixtures::{hit, FakeModel, FakeVectorStore};

struct Harness {
    engine: GlycoEngine,
    model: Arc<FakeModel>,
    _state_dir: tempfile::TempDir,
    log_dir: tempfile::TempDir,
}

fn harness(config: EngineConfig, store: FakeVectorStore, model: FakeModel) -> Harness {
    let model = Arc::new(model);
    let state_dir = tempfile::tempdir().unwrap();
    let log_dir = tempfile::tempdir().unwrap();
    let engine = GlycoEngine::new(
        config,
        Arc::new(store),
        Arc::clone(&model) as Arc<dyn IGenerativeModel>,
        Arc::new(JsonSessionStore::new(state_dir.path())),
        Arc::new(JsonlAuditSink::open(log_dir.path()).unwrap()),
    )
    .unwrap();
    Harness {
        engine,
        model,
        _state_dir: state_dir,
        log_dir,
    }
}

fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.generation.base_backoff_ms = 1;
    config
}

fn strong_chunks() -> Vec<SearchHit> {
    // Distances of 0.15..0.22 become confidences of 0.85..0.78.
    vec![
        hit("Pizza's fat content slows gastric emptying.", 0.15),
        hit("High-fat meals delay the glucose peak by hours.", 0.18),
        hit("Extended boluses are discussed with care teams.", 0.20),
        hit("Fiber further flattens the absorption curve.", 0.22),
    ]
}

#[test]
fn sufficient_coverage_answers_from_retrieval_alone() {
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always(
        "Pizza digests slowly because of its fat content, so the glucose rise \
         shows up hours later [1][2].",
    );
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    assert_eq!(response.classification.category, QueryCategory::KnowledgeBase);
    assert_eq!(response.breakdown.primary_source_type, PrimarySource::Retrieved);
    assert_eq!(response.breakdown.retrieved_ratio, 1.0);
    assert_eq!(response.breakdown.generated_ratio, 0.0);
    assert_eq!(response.audit.verdict, Verdict::Allow);
    assert!(response.answer.contains("digests slowly"));
    // The model saw the retrieved chunks as numbered context.
    let prompts = h.model.prompts.lock().unwrap();
    assert!(prompts[0].contains("[1]"));
    assert!(prompts[0].contains("gastric emptying"));
}

#[test]
fn sparse_coverage_leans_generated_and_warns_on_citations() {
    let store = FakeVectorStore::new().with_missing("knowledge_base");
    let model = FakeModel::always(
        "The glycemic index ranks carbohydrate foods by how quickly they push \
         glucose up compared with pure glucose. Foods with more fiber, fat, or \
         protein digest slowly and sit further down the scale. Cooking method, \
         ripeness, and portion size all shift the effective value, which is why \
         the same food behaves differently from meal to meal.",
    );
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("what is the glycemic index", None, &[])
        .unwrap();

    assert!(response.breakdown.generated_ratio >= 0.7);
    assert_eq!(response.breakdown.primary_source_type, PrimarySource::Generated);
    assert_eq!(response.audit.verdict, Verdict::Warn);
    assert!(response
        .audit
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::InsufficientCitations));
    assert!(response.answer.ends_with(constants::VERIFY_DISCLAIMER));
}

#[test]
fn generation_retries_until_a_good_answer() {
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::new(vec![
        Err("transient".to_string()),
        Ok(String::new()),
        Ok("Fat slows digestion, shifting the peak later [1].".to_string()),
    ]);
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    assert_eq!(h.model.call_count(), 3);
    assert!(response.answer.contains("shifting the peak"));
}

#[test]
fn safety_sensitive_exhaustion_falls_back_to_the_safe_answer() {
    let store = FakeVectorStore::new().with_missing("clinical_guidelines");
    let model = FakeModel::always_failing("provider down");
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("my sugar has been over 400 all day", None, &[])
        .unwrap();

    assert_eq!(
        response.classification.category,
        QueryCategory::ClinicalGuidelines
    );
    assert_eq!(response.answer, constants::SAFE_FALLBACK_ANSWER);
}

#[test]
fn non_sensitive_exhaustion_returns_a_degraded_notice() {
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always_failing("provider down");
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    assert_eq!(response.answer, constants::GENERATION_DEGRADED_NOTICE);
    assert_eq!(h.model.call_count() as u32, fast_config().generation.max_attempts);
}

#[test]
fn hung_model_is_abandoned_at_the_query_deadline() {
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always("A perfectly good answer, two seconds too late.")
        .with_delay(std::time::Duration::from_secs(2));
    let mut config = fast_config();
    config.generation.query_budget_ms = 150;
    let h = harness(config, store, model);

    let started = std::time::Instant::now();
    let response = h
        .engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(1));
    assert_eq!(response.answer, constants::GENERATION_DEGRADED_NOTICE);
}

#[test]
fn ui_instructions_for_a_bare_algorithm_are_flagged() {
    let store = FakeVectorStore::new().with_hits(
        "user_sources",
        vec![hit("Adjusting targets is done from the pump's Options menu.", 0.2)],
    );
    let model = FakeModel::always("Tap on Control-IQ and pick a new target range.");
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("how do I change my target range on control-iq", None, &[])
        .unwrap();

    assert_eq!(response.audit.verdict, Verdict::Warn);
    assert!(response
        .audit
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::DeviceHallucination));
    // Warned, not blocked: the answer text survives.
    assert!(response.answer.contains("Tap on Control-IQ"));
}

#[test]
fn blocked_answer_is_replaced_and_logged() {
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always("You should take 4 units of insulin before the pizza.");
    let h = harness(fast_config(), store, model);

    let response = h
        .engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    assert_eq!(response.audit.verdict, Verdict::Block);
    assert_eq!(response.answer, constants::SAFE_FALLBACK_ANSWER);
    // The violation stays visible to the caller even though the text is gone.
    assert!(response
        .audit
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::DosingInstruction));

    let events = fs::read_to_string(h.log_dir.path().join("safety_events.jsonl")).unwrap();
    assert_eq!(events.lines().count(), 1);
}

#[test]
fn session_queries_get_assignment_rows_when_experiments_run() {
    let mut config = fast_config();
    config.experiments.enabled = true;
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always("Fat slows digestion, shifting the peak later [1].");
    let h = harness(config, store, model);

    let session = SessionHash::from_raw("device-owner-7");
    h.engine
        .handle_query("why does pizza spike me six hours later", Some(&session), &[])
        .unwrap();
    h.engine
        .handle_query("why does pasta do the same", Some(&session), &[])
        .unwrap();

    let rows = fs::read_to_string(h.log_dir.path().join("assignments.jsonl")).unwrap();
    assert_eq!(rows.lines().count(), 2);
    // Same session, same experiment: the cohort never flips.
    let cohorts: Vec<String> = rows
        .lines()
        .map(|line| {
            serde_json::from_str::<serde_json::Value>(line).unwrap()["cohort"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(cohorts[0], cohorts[1]);
}

#[test]
fn anonymous_queries_produce_no_assignment_rows() {
    let mut config = fast_config();
    config.experiments.enabled = true;
    let store = FakeVectorStore::new().with_hits("knowledge_base", strong_chunks());
    let model = FakeModel::always("Fat slows digestion, shifting the peak later [1].");
    let h = harness(config, store, model);

    h.engine
        .handle_query("why does pizza spike me six hours later", None, &[])
        .unwrap();

    let rows = fs::read_to_string(h.log_dir.path().join("assignments.jsonl")).unwrap();
    assert!(rows.is_empty());
}
