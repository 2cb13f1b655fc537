use tracing::{debug, error, warn};

use glyco_core::config::SafetyConfig;
use glyco_core::constants;
use glyco_core::models::{KnowledgeBreakdown, SafetyAuditResult, Verdict, ViolationKind};

use crate::checks::{default_battery, SafetyCheck};
use crate::context::AuditContext;

/// Runs the check battery over one candidate answer.
///
/// Every audit is computed fresh. The same answer text can be fine for one
/// query and dangerous for another, so results are never cached or keyed
/// by answer alone.
pub struct SafetyAuditor {
    config: SafetyConfig,
    battery: Vec<Box<dyn SafetyCheck>>,
}

impl SafetyAuditor {
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            battery: default_battery(),
        }
    }

    /// Audit one candidate answer against its query and retrieval context.
    pub fn audit(
        &self,
        answer: &str,
        query: &str,
        breakdown: &KnowledgeBreakdown,
        retrieval_texts: &[String],
    ) -> SafetyAuditResult {
        let ctx = AuditContext {
            answer,
            query,
            breakdown,
            retrieval_texts,
            config: &self.config,
        };

        let mut violations = Vec::new();
        for check in &self.battery {
            match check.run(&ctx) {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!(check = check.name(), count = found.len(), "safety findings");
                    }
                    violations.extend(found);
                }
                // A broken check abstains. One failing pattern must not
                // take the whole audit down with it.
                Err(e) => {
                    error!(check = check.name(), error = %e, "safety check failed, abstaining");
                }
            }
        }

        let verdict = violations
            .iter()
            .map(|v| v.severity)
            .max()
            .unwrap_or(Verdict::Allow);

        let required_disclaimer = match verdict {
            Verdict::Block => Some(constants::SAFE_FALLBACK_ANSWER.to_string()),
            _ if violations
                .iter()
                .any(|v| v.kind == ViolationKind::InsufficientCitations) =>
            {
                Some(constants::VERIFY_DISCLAIMER.to_string())
            }
            _ => None,
        };

        if verdict == Verdict::Block {
            warn!(violations = violations.len(), "answer blocked by safety audit");
        }

        SafetyAuditResult {
            verdict,
            violations,
            required_disclaimer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyco_core::models::PrimarySource;

    fn retrieved_breakdown() -> KnowledgeBreakdown {
        KnowledgeBreakdown {
            retrieved_ratio: 1.0,
            generated_ratio: 0.0,
            primary_source_type: PrimarySource::Retrieved,
            blended_confidence: 0.8,
        }
    }

    #[test]
    fn clean_answer_is_allowed() {
        let auditor = SafetyAuditor::new(SafetyConfig::default());
        let result = auditor.audit(
            "Fiber slows carbohydrate absorption, which flattens the rise.",
            "why does fiber change my glucose curve",
            &retrieved_breakdown(),
            &[],
        );
        assert_eq!(result.verdict, Verdict::Allow);
        assert!(result.violations.is_empty());
        assert!(result.required_disclaimer.is_none());
    }

    #[test]
    fn block_beats_warn_across_checks() {
        let auditor = SafetyAuditor::new(SafetyConfig::default());
        let result = auditor.audit(
            "You should take 4 units of insulin now. Tap on Control-IQ to confirm.",
            "what should I do about this reading",
            &retrieved_breakdown(),
            &[],
        );
        assert_eq!(result.verdict, Verdict::Block);
        assert!(result.violations.len() >= 2);
    }
}
