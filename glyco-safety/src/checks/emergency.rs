//! Emergency escalation check.
//!
//! When either the query or the answer carries emergency-severity language,
//! the answer must tell the reader to escalate to emergency services or
//! their care team. An answer that discusses a severe episode without that
//! instruction is blocked.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::errors::GlycoResult;
use glyco_core::models::{Violation, ViolationKind};

use crate::context::AuditContext;

macro_rules! check_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

check_regex!(
    RE_SEVERITY,
    r"(?i)\b(unconscious|passed\s+out|unresponsive|seizure|seizing|can'?t\s+wake|won'?t\s+wake|severe\s+hypo(glycemia)?|dka|diabetic\s+ketoacidosis)\b"
);

// Glucose readings at emergency extremes, stated with units.
check_regex!(
    RE_EXTREME_READING,
    r"(?i)\b(([1-4]?\d|5[0-4])|([4-9]\d{2}))\s*(mg/dl|mg/dL)\b"
);

// The same extremes stated bare; only a reading when a glucose term sits
// within a short window on either side.
check_regex!(RE_EXTREME_NUMBER, r"\b(([2-5]\d)|([4-9]\d{2}))\b");
check_regex!(RE_GLUCOSE_TERM, r"(?i)\b(glucose|blood\s+sugar|sugar|bg|cgm)\b");

check_regex!(
    RE_ESCALATION,
    r"(?i)\b(call\s+911|911|emergency\s+services|emergency\s+room|\bER\b|urgent\s+care|glucagon|call\s+your\s+(doctor|care\s+team|clinic)|seek\s+(immediate\s+)?medical)\b"
);

pub struct EmergencySeverityCheck;

impl super::SafetyCheck for EmergencySeverityCheck {
    fn name(&self) -> &'static str {
        "emergency_escalation"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>> {
        let severe = [ctx.query, ctx.answer].iter().any(|text| {
            matches(&RE_SEVERITY, text) || has_extreme_reading(text)
        });
        if !severe {
            return Ok(Vec::new());
        }
        if matches(&RE_ESCALATION, ctx.answer) {
            return Ok(Vec::new());
        }
        Ok(vec![Violation::new(
            ViolationKind::MissingEmergencyEscalation,
            "emergency-severity language without an escalation instruction",
        )])
    }
}

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().map(|r| r.is_match(text)).unwrap_or(false)
}

/// An extreme glucose value stated as a reading, with or without units.
fn has_extreme_reading(text: &str) -> bool {
    if let Some(re) = RE_EXTREME_READING.as_ref() {
        if re.find_iter(text).any(|m| !is_rate_number(text, m.start())) {
            return true;
        }
    }
    let (Some(number), Some(term)) = (RE_EXTREME_NUMBER.as_ref(), RE_GLUCOSE_TERM.as_ref())
    else {
        return false;
    };
    number
        .find_iter(text)
        .filter(|m| !is_rate_number(text, m.start()))
        .any(|m| {
            term.is_match(window_before(text, m.start(), 24))
                || term.is_match(window_after(text, m.end(), 24))
        })
}

/// Rate expressions like "1 unit per 50 mg/dL" reuse the same numbers and
/// are not readings.
fn is_rate_number(text: &str, at: usize) -> bool {
    let prefix = text[..at].trim_end();
    let last_word = prefix
        .rsplit(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("");
    matches!(
        last_word.to_lowercase().as_str(),
        "per" | "every" | "above" | "below" | "by"
    )
}

fn window_before(text: &str, end: usize, max: usize) -> &str {
    let mut start = end.saturating_sub(max);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..end]
}

fn window_after(text: &str, start: usize, max: usize) -> &str {
    let mut end = (start + max).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}
