use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use glyco_classification::ClassifierEngine;
use glyco_core::errors::{GenerationError, GlycoResult};
use glyco_core::models::{
    AssignmentRecord, Classification, Coverage, EngineResponse, ExperimentAssignment,
    QueryCategory, SafetyAuditResult, SafetyEventRecord, Turn, Verdict,
};
use glyco_core::traits::{IAuditSink, IGenerativeModel, ISessionStore, IVectorStore};
use glyco_core::{constants, EngineConfig, SessionHash};
use glyco_experiments::ExperimentManager;
use glyco_personalization::PersonalizationEngine;
use glyco_retrieval::{CollectionMap, KnowledgeBlender, RetrievalOrchestrator};
use glyco_safety::SafetyAuditor;

use crate::prompt;

/// The full per-query pipeline.
///
/// Construction validates the configuration once; after that, every
/// `handle_query` call is independent and deterministic up to the model.
pub struct GlycoEngine {
    config: EngineConfig,
    classifier: ClassifierEngine,
    orchestrator: RetrievalOrchestrator,
    blender: KnowledgeBlender,
    personalization: Arc<PersonalizationEngine>,
    auditor: SafetyAuditor,
    experiments: ExperimentManager,
    model: Arc<dyn IGenerativeModel>,
    audit_sink: Arc<dyn IAuditSink>,
}

impl GlycoEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn IVectorStore>,
        model: Arc<dyn IGenerativeModel>,
        session_store: Arc<dyn ISessionStore>,
        audit_sink: Arc<dyn IAuditSink>,
    ) -> GlycoResult<Self> {
        config.validate()?;

        let personalization = Arc::new(PersonalizationEngine::new(
            config.personalization.clone(),
            session_store,
        ));
        let map = CollectionMap::from_config(&config.retrieval)?;
        let orchestrator = RetrievalOrchestrator::new(store, map, config.retrieval.clone())
            .with_personalization(Arc::clone(&personalization));

        Ok(Self {
            classifier: ClassifierEngine::new(config.classifier.clone())
                .with_fallback_model(Arc::clone(&model)),
            orchestrator,
            blender: KnowledgeBlender::new(config.blend.clone()),
            auditor: SafetyAuditor::new(config.safety.clone()),
            experiments: ExperimentManager::new(config.experiments.clone()),
            personalization,
            model,
            audit_sink,
            config,
        })
    }

    /// Device uploads, corrections, and feedback route through here.
    pub fn personalization(&self) -> &PersonalizationEngine {
        &self.personalization
    }

    /// Answer one query end to end. The answer is never empty: generation
    /// failures on safety-sensitive categories fall back to a precomposed
    /// safe answer, and blocked answers are replaced by it.
    pub fn handle_query(
        &self,
        query: &str,
        session: Option<&SessionHash>,
        history: &[Turn],
    ) -> GlycoResult<EngineResponse> {
        let query_id = Uuid::new_v4();
        let deadline =
            Instant::now() + Duration::from_millis(self.config.generation.query_budget_ms);

        let classification = self.classifier.classify(query, history);
        debug!(
            %query_id,
            category = classification.category.name(),
            confidence = classification.confidence.value(),
            "classified query"
        );

        let fanout = classification.fanout_categories();
        let (results, quality, diagnostics) = self.orchestrator.retrieve(query, &fanout, session);
        if !diagnostics.failures.is_empty() {
            debug!(
                %query_id,
                failed = diagnostics.failures.len(),
                attempted = diagnostics.collections_attempted,
                "retrieval degraded"
            );
        }

        let assignment = session.and_then(|s| self.experiments.assign(s));
        let cohort_override = assignment
            .as_ref()
            .and_then(|a| self.experiments.override_for(a));

        let profile = session.and_then(|s| self.personalization.profile(s));
        let personal_data_available = profile.as_ref().map(|p| p.has_devices()).unwrap_or(false)
            && fanout.contains(&QueryCategory::PersonalData);

        let breakdown = self
            .blender
            .blend(&quality, personal_data_available, cohort_override);

        // An answer is never empty. Exhaustion on a safety-sensitive
        // category returns the precomposed safe text; elsewhere a
        // transparent degraded notice.
        let prompt = prompt::build(query, history, &results, &breakdown, profile.as_ref());
        let answer = match self.generate_with_retry(&prompt, deadline) {
            Ok(text) => text,
            Err(e) if classification.category.is_safety_sensitive() => {
                warn!(%query_id, error = %e, "generation failed on safety-sensitive query, using safe fallback");
                constants::SAFE_FALLBACK_ANSWER.to_string()
            }
            Err(e) => {
                warn!(%query_id, error = %e, "generation failed, returning degraded notice");
                constants::GENERATION_DEGRADED_NOTICE.to_string()
            }
        };

        // Audit every candidate, the fallback included. The verdict depends
        // on the query and retrieval context, not just the answer text.
        let retrieval_texts: Vec<String> = results.iter().map(|r| r.text.clone()).collect();
        let audit = self
            .auditor
            .audit(&answer, query, &breakdown, &retrieval_texts);

        let answer = finalize_answer(answer, audit.verdict, audit.required_disclaimer.as_deref());

        self.log_outcome(
            query_id,
            session,
            assignment.as_ref(),
            &classification,
            quality.chunk_count,
            quality.coverage,
            &audit,
            answer.chars().count(),
        );

        info!(
            %query_id,
            category = classification.category.name(),
            coverage = ?quality.coverage,
            verdict = ?audit.verdict,
            "query handled"
        );

        Ok(EngineResponse {
            query_id,
            answer,
            classification,
            breakdown,
            audit,
        })
    }

    /// Call the model with exponential backoff, bounded by the query
    /// deadline. An empty answer counts as a failed attempt. Each call runs
    /// on its own thread so a hung model cannot outlive the budget; a call
    /// still running at the deadline is abandoned.
    fn generate_with_retry(
        &self,
        prompt: &str,
        deadline: Instant,
    ) -> Result<String, GenerationError> {
        let retry = &self.config.generation;
        for attempt in 0..retry.max_attempts {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(GenerationError::BudgetExpired {
                    budget_ms: retry.query_budget_ms,
                });
            }

            let (tx, rx) = mpsc::channel();
            let model = Arc::clone(&self.model);
            let call_prompt = prompt.to_string();
            let sampling = retry.sampling.clone();
            thread::spawn(move || {
                let _ = tx.send(model.generate(&call_prompt, &sampling));
            });

            match rx.recv_timeout(remaining) {
                Ok(Ok(text)) if !text.trim().is_empty() => return Ok(text),
                Ok(Ok(_)) => {
                    warn!(attempt, "model returned empty content");
                }
                Ok(Err(e)) => {
                    warn!(attempt, error = %e, "model call failed");
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!(attempt, "model call outran the query budget");
                    return Err(GenerationError::BudgetExpired {
                        budget_ms: retry.query_budget_ms,
                    });
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!(attempt, "model call worker dropped without answering");
                }
            }
            if attempt + 1 < retry.max_attempts {
                let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
                let backoff =
                    Duration::from_millis(retry.base_backoff_ms.saturating_mul(factor));
                let remaining = deadline.saturating_duration_since(Instant::now());
                std::thread::sleep(backoff.min(remaining));
            }
        }
        Err(GenerationError::AttemptsExhausted {
            attempts: retry.max_attempts,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn log_outcome(
        &self,
        query_id: Uuid,
        session: Option<&SessionHash>,
        assignment: Option<&ExperimentAssignment>,
        classification: &Classification,
        chunk_count: usize,
        coverage: Coverage,
        audit: &SafetyAuditResult,
        answer_chars: usize,
    ) {
        if let Some(assignment) = assignment {
            let record = AssignmentRecord {
                query_id,
                session_hash: assignment.session_hash.clone(),
                experiment_name: assignment.experiment_name.clone(),
                cohort: assignment.cohort,
                category: classification.category.name().to_string(),
                coverage,
                chunk_count,
                verdict: audit.verdict,
                timestamp: Utc::now(),
            };
            if let Err(e) = self.audit_sink.record_assignment(&record) {
                warn!(%query_id, error = %e, "assignment log append failed");
            }
        }

        if audit.verdict > Verdict::Allow {
            let record = SafetyEventRecord {
                query_id,
                session_hash: session.cloned(),
                verdict: audit.verdict,
                violation_kinds: audit.violations.iter().map(|v| v.kind).collect(),
                answer_chars,
                timestamp: Utc::now(),
            };
            if let Err(e) = self.audit_sink.record_safety_event(&record) {
                warn!(%query_id, error = %e, "safety event log append failed");
            }
        }
    }
}

/// Apply the audit outcome to the candidate answer. A block replaces the
/// text outright; a warn-level disclaimer is appended.
fn finalize_answer(answer: String, verdict: Verdict, disclaimer: Option<&str>) -> String {
    match verdict {
        Verdict::Block => disclaimer
            .unwrap_or(constants::SAFE_FALLBACK_ANSWER)
            .to_string(),
        Verdict::Warn => match disclaimer {
            Some(d) if !answer.contains(d) => format!("{answer}\n\n{d}"),
            _ => answer,
        },
        Verdict::Allow => answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_verdict_replaces_the_answer() {
        let out = finalize_answer(
            "Take 4 units now.".to_string(),
            Verdict::Block,
            Some(constants::SAFE_FALLBACK_ANSWER),
        );
        assert_eq!(out, constants::SAFE_FALLBACK_ANSWER);
    }

    #[test]
    fn warn_appends_disclaimer_once() {
        let once = finalize_answer(
            "Some answer.".to_string(),
            Verdict::Warn,
            Some(constants::VERIFY_DISCLAIMER),
        );
        let twice = finalize_answer(once.clone(), Verdict::Warn, Some(constants::VERIFY_DISCLAIMER));
        assert_eq!(once, twice);
    }

    #[test]
    fn allow_passes_through() {
        let out = finalize_answer("Fine.".to_string(), Verdict::Allow, None);
        assert_eq!(out, "Fine.");
    }
}
