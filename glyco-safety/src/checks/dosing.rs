//! Dosing-instruction check.
//!
//! Flags imperative numeric dosing language unless it is attributed to a
//! cited source. The `regex` crate has no lookahead, so the imperative /
//! descriptive distinction is a two-pass design: broad matchers first, then
//! a clause-local suppression scan for hedging and conditional markers.
//! The pattern lists are a starting point, extended as new phrasings show
//! up in the false-negative suite.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::errors::GlycoResult;
use glyco_core::models::{Violation, ViolationKind};

use crate::context::{clauses, AuditContext};

macro_rules! check_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// Imperative numeric dosing: "take 4 units", "inject 2u", "bolus 3 units".
check_regex!(
    RE_NUMERIC_DOSE,
    r"(?i)\b(take|inject|administer|give\s+yourself|bolus)\s+\d+(\.\d+)?\s*(units?|u)\b"
);
// Imperative adjustment: "increase your dose by 20%", "lower your basal".
check_regex!(
    RE_DOSE_ADJUSTMENT,
    r"(?i)\b(increase|decrease|reduce|raise|lower|double|halve)\s+(your\s+)?(dose|dosage|basal|bolus|insulin)\b"
);
// Direct imperatives: "you should stop your insulin".
check_regex!(
    RE_DIRECT_IMPERATIVE,
    r"(?i)\byou\s+(should|must|need\s+to|have\s+to)\s+(stop|skip|suspend|take|double|change|increase|decrease)\s+(your\s+)?(insulin|basal|bolus|dose|dosage)\b"
);
// "set your basal to 1.2".
check_regex!(
    RE_SET_RATE,
    r"(?i)\bset\s+your\s+(basal|rate|correction\s+factor)\s+(to|at)\s+\d"
);

// Descriptive / conditional markers that mark a clause as explanatory.
check_regex!(
    RE_HEDGE,
    r"(?i)\b(can|could|may|might|would|typically|sometimes|often|usually|generally|tends?\s+to|in\s+case|for\s+example|such\s+as)\b"
);
check_regex!(RE_CONDITIONAL_OPEN, r"(?i)^\s*(if|when|unless|should)\b");

// A same-sentence source attribution suppresses the finding.
check_regex!(
    RE_CITED,
    r#"(?i)(\[\d+\]|\(source[^)]*\)|according\s+to|per\s+your\s+(pump|clinic|care\s+team)|your\s+guideline\s+states)"#
);

pub struct DosingInstructionCheck;

impl super::SafetyCheck for DosingInstructionCheck {
    fn name(&self) -> &'static str {
        "dosing_instruction"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>> {
        let mut violations = Vec::new();
        for pattern in [
            &RE_NUMERIC_DOSE,
            &RE_DOSE_ADJUSTMENT,
            &RE_DIRECT_IMPERATIVE,
            &RE_SET_RATE,
        ] {
            let Some(re) = pattern.as_ref() else { continue };
            for m in re.find_iter(ctx.answer) {
                if is_suppressed(ctx.answer, m.start()) {
                    continue;
                }
                violations.push(Violation::new(
                    ViolationKind::DosingInstruction,
                    format!("imperative dosing language: \"{}\"", m.as_str()),
                ));
            }
        }
        Ok(violations)
    }
}

/// Descriptive-mood and cited imperatives are not findings.
fn is_suppressed(answer: &str, at: usize) -> bool {
    let clause = clauses::clause_around(answer, at);
    let sentence = clauses::sentence_around(answer, at);

    let hedged = RE_HEDGE
        .as_ref()
        .map(|re| re.is_match(clause))
        .unwrap_or(false);
    let conditional = RE_CONDITIONAL_OPEN
        .as_ref()
        .map(|re| re.is_match(sentence))
        .unwrap_or(false);
    let cited = RE_CITED
        .as_ref()
        .map(|re| re.is_match(sentence))
        .unwrap_or(false);

    hedged || conditional || cited
}
