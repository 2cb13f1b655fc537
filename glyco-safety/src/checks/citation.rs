//! Citation-density check for partially generated answers.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::constants;
use glyco_core::errors::GlycoResult;
use glyco_core::models::{Violation, ViolationKind};

use crate::context::AuditContext;

macro_rules! check_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// Bracket markers, "Source:" labels, and prose attributions all count.
check_regex!(
    RE_CITATION_MARKER,
    r"(?i)\[\d+\]|\bsource:\s*\S|\baccording\s+to\b|\bper\s+(?:the\s+)?[A-Z]"
);

pub struct CitationSufficiencyCheck;

impl super::SafetyCheck for CitationSufficiencyCheck {
    fn name(&self) -> &'static str {
        "citation_density"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>> {
        // Fully retrieved answers carry provenance through their chunks;
        // only answers with a generated component need inline markers.
        if ctx.breakdown.generated_ratio <= 0.0 {
            return Ok(Vec::new());
        }
        // Precomposed engine texts contain no model content to attribute,
        // whatever the breakdown for the failed generation said.
        if ctx.answer == constants::SAFE_FALLBACK_ANSWER
            || ctx.answer == constants::GENERATION_DEGRADED_NOTICE
        {
            return Ok(Vec::new());
        }
        if ctx.answer.chars().count() < ctx.config.citation_min_answer_chars {
            return Ok(Vec::new());
        }
        let count = RE_CITATION_MARKER
            .as_ref()
            .map(|re| re.find_iter(ctx.answer).count())
            .unwrap_or(0);
        if count >= ctx.config.min_citations {
            return Ok(Vec::new());
        }
        Ok(vec![Violation::new(
            ViolationKind::InsufficientCitations,
            format!(
                "{count} citation markers found, {} required",
                ctx.config.min_citations
            ),
        )])
    }
}
