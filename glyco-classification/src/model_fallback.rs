//! Model-based fallback for queries no rule group matched.
//!
//! The model is asked for a single JSON object; anything unparseable
//! defaults to a low-confidence `KnowledgeBase` classification.

use serde::Deserialize;
use tracing::warn;

use glyco_core::models::{Classification, QueryCategory};
use glyco_core::traits::{GenerationConfig, IGenerativeModel};
use glyco_core::Confidence;

const CLASSIFICATION_PROMPT: &str = "You route questions about diabetes \
self-management to a knowledge source. Reply with exactly one JSON object, \
no prose: {\"category\": <one of \"clinical_guidelines\", \"user_sources\", \
\"knowledge_base\", \"personal_data\">, \"confidence\": <0.0-1.0>}.\n\nQuestion: ";

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    category: String,
    confidence: f64,
}

fn parse_category(name: &str) -> Option<QueryCategory> {
    match name {
        "clinical_guidelines" => Some(QueryCategory::ClinicalGuidelines),
        "user_sources" => Some(QueryCategory::UserSources),
        "knowledge_base" => Some(QueryCategory::KnowledgeBase),
        "personal_data" => Some(QueryCategory::PersonalData),
        _ => None,
    }
}

/// Ask the model to classify. Never errors: every failure path degrades to
/// the low-confidence default.
pub fn classify_via_model(
    model: &dyn IGenerativeModel,
    query: &str,
    parse_failure_confidence: f64,
) -> Classification {
    let prompt = format!("{CLASSIFICATION_PROMPT}{query}");
    let sampling = GenerationConfig {
        temperature: 0.0,
        max_output_tokens: 64,
    };

    let raw = match model.generate(&prompt, &sampling) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "classification fallback call failed");
            return default_classification(parse_failure_confidence, "model call failed");
        }
    };

    match parse_verdict(&raw) {
        Some((category, confidence)) => Classification {
            category,
            confidence: Confidence::new(confidence),
            secondary_categories: Vec::new(),
            reasoning: "model fallback".to_string(),
        },
        None => {
            warn!(raw = %raw, "unparseable classification fallback output");
            default_classification(parse_failure_confidence, "model output unparseable")
        }
    }
}

/// Extract the first JSON object in the output and parse it. Models often
/// wrap JSON in prose or code fences; take the outermost brace span.
fn parse_verdict(raw: &str) -> Option<(QueryCategory, f64)> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    let verdict: ModelVerdict = serde_json::from_str(&raw[start..=end]).ok()?;
    let category = parse_category(verdict.category.trim())?;
    Some((category, verdict.confidence.clamp(0.0, 1.0)))
}

fn default_classification(confidence: f64, reason: &str) -> Classification {
    Classification {
        category: QueryCategory::KnowledgeBase,
        confidence: Confidence::new(confidence),
        secondary_categories: Vec::new(),
        reasoning: format!("fallback default: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let (cat, conf) =
            parse_verdict(r#"{"category": "personal_data", "confidence": 0.8}"#).unwrap();
        assert_eq!(cat, QueryCategory::PersonalData);
        assert_eq!(conf, 0.8);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Sure!\n```json\n{\"category\": \"knowledge_base\", \"confidence\": 0.6}\n```";
        assert!(parse_verdict(raw).is_some());
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(parse_verdict(r#"{"category": "weather", "confidence": 0.9}"#).is_none());
    }

    #[test]
    fn clamps_out_of_range_confidence() {
        let (_, conf) =
            parse_verdict(r#"{"category": "knowledge_base", "confidence": 3.0}"#).unwrap();
        assert_eq!(conf, 1.0);
    }
}
