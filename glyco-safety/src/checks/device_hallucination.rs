//! Device-architecture hallucination check.
//!
//! An automated-delivery algorithm is software hosted on a pump. There is
//! nothing to tap on. When the query or retrieval context establishes an
//! entity as an algorithm, any generated phrase implying direct UI
//! interaction with that entity is flagged. Correct phrasing names the
//! hosting hardware; a same-sentence host mention suppresses the finding.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::errors::GlycoResult;
use glyco_core::models::{Verdict, Violation, ViolationKind};

use crate::context::{clauses, AuditContext};

macro_rules! check_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

check_regex!(
    RE_UI_VERB,
    r"(?i)\b(tap(\s+on)?|press|click(\s+on)?|open|select|navigate\s+to|go\s+to|swipe(\s+to)?)\b"
);

// Context patterns establishing "X is an algorithm" / "X runs on Y".
check_regex!(
    RE_ALGO_DECLARATION,
    r"(?i)([A-Z][\w:\-]*(?:[ \-][A-Z0-9][\w:\-]*)*)\s+(?:algorithm\s+|technology\s+|feature\s+)?(?:runs\s+on|is\s+hosted\s+on|is\s+an?\s+(algorithm|software))"
);

/// Known algorithm → hosting hardware pairs.
const KNOWN_ALGORITHMS: &[(&str, &str)] = &[
    ("control-iq", "t:slim"),
    ("control iq", "t:slim"),
    ("basal-iq", "t:slim"),
    ("basal iq", "t:slim"),
    ("smartguard", "minimed"),
    ("camaps fx", "ypsopump"),
];

pub struct DeviceHallucinationCheck;

impl super::SafetyCheck for DeviceHallucinationCheck {
    fn name(&self) -> &'static str {
        "device_hallucination"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>> {
        // Entities under scrutiny: the static catalog plus anything the
        // retrieval context (or query) declares as an algorithm.
        let mut entities: Vec<(String, Option<String>)> = KNOWN_ALGORITHMS
            .iter()
            .map(|(algo, host)| (algo.to_string(), Some(host.to_string())))
            .collect();
        for text in ctx
            .retrieval_texts
            .iter()
            .map(|s| s.as_str())
            .chain(std::iter::once(ctx.query))
        {
            entities.extend(
                declared_algorithms(text)
                    .into_iter()
                    .map(|(name, host)| (name.to_lowercase(), host)),
            );
        }

        let answer_lower = ctx.answer.to_lowercase();
        let Some(verb_re) = RE_UI_VERB.as_ref() else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        for m in verb_re.find_iter(&answer_lower) {
            let window_end = (m.end() + 48).min(answer_lower.len());
            let window_end = (m.end()..=window_end)
                .rev()
                .find(|&i| answer_lower.is_char_boundary(i))
                .unwrap_or(m.end());
            let window = &answer_lower[m.end()..window_end];

            for (entity, host) in &entities {
                if !window.contains(entity.as_str()) {
                    continue;
                }
                let sentence = clauses::sentence_around(&answer_lower, m.start());
                if let Some(host) = host {
                    if sentence.contains(&host.to_lowercase()) {
                        continue; // tied to the hosting hardware
                    }
                }
                let severity = if context_confirms_software(ctx, entity) {
                    Verdict::Block
                } else {
                    Verdict::Warn
                };
                violations.push(
                    Violation::new(
                        ViolationKind::DeviceHallucination,
                        format!(
                            "UI interaction with algorithm \"{entity}\": \"{} {}\"",
                            m.as_str(),
                            window.split_whitespace().take(6).collect::<Vec<_>>().join(" ")
                        ),
                    )
                    .with_severity(severity),
                );
                break;
            }
        }
        Ok(violations)
    }
}

/// Extract `(name, host)` pairs from declarations like
/// "Control-IQ runs on the t:slim X2" or "Algorithm X is an algorithm".
fn declared_algorithms(text: &str) -> Vec<(String, Option<String>)> {
    let Some(re) = RE_ALGO_DECLARATION.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| {
            let mut name = caps.get(1)?.as_str().trim();
            // The capture is anchored on capitalization, so a leading
            // sentence-initial article gets swept in.
            for article in ["The ", "A ", "An "] {
                name = name.strip_prefix(article).unwrap_or(name).trim();
            }
            if name.is_empty() {
                return None;
            }
            // Host, when declared: the trailing "runs on <host>" span.
            let tail = &text[caps.get(0)?.end()..];
            let host = tail
                .split(['.', ',', ';', '\n'])
                .next()
                .and_then(|s| s.split(" and ").next())
                .map(|s| s.trim().trim_start_matches("the ").to_string())
                .filter(|s| !s.is_empty());
            Some((name.to_string(), host))
        })
        .collect()
}

/// Does the query or retrieval context explicitly call this entity an
/// algorithm or software? That hardens the finding from warn to block.
fn context_confirms_software(ctx: &AuditContext<'_>, entity: &str) -> bool {
    let needle = entity.to_lowercase();
    ctx.retrieval_texts
        .iter()
        .map(|s| s.as_str())
        .chain(std::iter::once(ctx.query))
        .any(|text| {
            let lower = text.to_lowercase();
            lower.contains(&needle)
                && (lower.contains("algorithm") || lower.contains("software") || lower.contains("runs on"))
        })
}

#[cfg(test)]
mod tests {
    use super::super::SafetyCheck;
    use super::*;
    use glyco_core::config::SafetyConfig;
    use glyco_core::models::{KnowledgeBreakdown, PrimarySource};

    fn breakdown() -> KnowledgeBreakdown {
        KnowledgeBreakdown {
            retrieved_ratio: 0.5,
            generated_ratio: 0.5,
            primary_source_type: PrimarySource::Hybrid,
            blended_confidence: 0.6,
        }
    }

    #[test]
    fn tap_on_known_algorithm_is_flagged() {
        let b = breakdown();
        let config = SafetyConfig::default();
        let ctx = AuditContext {
            answer: "Tap on Control-IQ and change your settings.",
            query: "how do I adjust control-iq",
            breakdown: &b,
            retrieval_texts: &[],
            config: &config,
        };
        let violations = DeviceHallucinationCheck.run(&ctx).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::DeviceHallucination);
    }

    #[test]
    fn host_tied_phrasing_is_not_flagged() {
        let b = breakdown();
        let config = SafetyConfig::default();
        let ctx = AuditContext {
            answer: "Open the Options menu on your t:slim X2 to review Control-IQ activity.",
            query: "how do I review control-iq activity",
            breakdown: &b,
            retrieval_texts: &[],
            config: &config,
        };
        assert!(DeviceHallucinationCheck.run(&ctx).unwrap().is_empty());
    }

    #[test]
    fn context_declared_algorithm_is_flagged_as_block() {
        let b = breakdown();
        let config = SafetyConfig::default();
        let retrieval = vec!["Loopwise runs on the PulsePod pump.".to_string()];
        let ctx = AuditContext {
            answer: "Tap on Loopwise's menu to adjust targets.",
            query: "how do I adjust loopwise",
            breakdown: &b,
            retrieval_texts: &retrieval,
            config: &config,
        };
        let violations = DeviceHallucinationCheck.run(&ctx).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Verdict::Block);
    }

    #[test]
    fn plain_hardware_instructions_pass() {
        let b = breakdown();
        let config = SafetyConfig::default();
        let ctx = AuditContext {
            answer: "Press the button on your pump to wake the screen.",
            query: "how do I wake my pump",
            breakdown: &b,
            retrieval_texts: &[],
            config: &config,
        };
        assert!(DeviceHallucinationCheck.run(&ctx).unwrap().is_empty());
    }
}
