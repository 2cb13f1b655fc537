//! Prompt assembly for the generative model.
//!
//! Retrieved chunks become numbered, source-tagged context blocks so the
//! model can cite them as `[n]`. The grounding instructions tighten as the
//! generated ratio grows.

use glyco_core::models::{KnowledgeBreakdown, RetrievalResult, Role, Turn, UserDeviceProfile};

pub fn build(
    query: &str,
    history: &[Turn],
    results: &[RetrievalResult],
    breakdown: &KnowledgeBreakdown,
    profile: Option<&UserDeviceProfile>,
) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a diabetes self-management assistant. Answer from the \
         numbered context blocks below and cite them as [n]. Never give \
         specific insulin dose amounts or timing; refer dosing decisions to \
         the reader's care team or their device's bolus calculator.\n",
    );

    if breakdown.generated_ratio > 0.0 {
        prompt.push_str(
            "The context is incomplete for this question. Where you rely on \
             general knowledge instead of a context block, say so explicitly \
             and keep those claims conservative.\n",
        );
    }

    if let Some(profile) = profile {
        prompt.push_str("\nThe reader's registered devices:\n");
        if let Some(pump) = &profile.pump {
            prompt.push_str(&format!("- pump: {pump}\n"));
        }
        if let Some(cgm) = &profile.cgm {
            prompt.push_str(&format!("- CGM: {cgm}\n"));
        }
        prompt.push_str("Prefer guidance that matches these devices.\n");
    }

    if !results.is_empty() {
        prompt.push_str("\nContext:\n");
        for (i, result) in results.iter().enumerate() {
            prompt.push_str(&format!(
                "[{n}] (from {collection})\n{text}\n\n",
                n = i + 1,
                collection = result.collection_id,
                text = result.text.trim(),
            ));
        }
    }

    let recent_user_turns: Vec<&Turn> = history
        .iter()
        .filter(|t| t.role == Role::User)
        .rev()
        .take(3)
        .collect();
    if !recent_user_turns.is_empty() {
        prompt.push_str("\nEarlier questions in this conversation:\n");
        for turn in recent_user_turns.iter().rev() {
            prompt.push_str(&format!("- {}\n", turn.text.trim()));
        }
    }

    prompt.push_str("\nQuestion: ");
    prompt.push_str(query.trim());
    prompt.push('\n');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyco_core::models::PrimarySource;
    use glyco_core::{Confidence, SessionHash};

    fn chunk(text: &str) -> RetrievalResult {
        RetrievalResult {
            text: text.to_string(),
            confidence: Confidence::new(0.8),
            collection_id: "kb_general".into(),
            is_user_device: false,
            distance: 0.2,
        }
    }

    fn retrieved() -> KnowledgeBreakdown {
        KnowledgeBreakdown {
            retrieved_ratio: 1.0,
            generated_ratio: 0.0,
            primary_source_type: PrimarySource::Retrieved,
            blended_confidence: 0.8,
        }
    }

    #[test]
    fn chunks_are_numbered_in_order() {
        let results = vec![chunk("First fact."), chunk("Second fact.")];
        let prompt = build("why", &[], &results, &retrieved(), None);
        let first = prompt.find("[1]").unwrap();
        let second = prompt.find("[2]").unwrap();
        assert!(first < second);
        assert!(prompt.contains("First fact."));
    }

    #[test]
    fn generated_component_adds_grounding_instruction() {
        let hybrid = KnowledgeBreakdown {
            retrieved_ratio: 0.4,
            generated_ratio: 0.6,
            primary_source_type: PrimarySource::Hybrid,
            blended_confidence: 0.6,
        };
        let sparse_prompt = build("why", &[], &[], &hybrid, None);
        let full_prompt = build("why", &[], &[], &retrieved(), None);
        assert!(sparse_prompt.contains("incomplete"));
        assert!(!full_prompt.contains("incomplete"));
    }

    #[test]
    fn profile_devices_appear_in_prompt() {
        let mut profile = UserDeviceProfile::new(SessionHash::from_raw("u"));
        profile.pump = Some("t:slim X2".to_string());
        let prompt = build("how", &[], &[], &retrieved(), Some(&profile));
        assert!(prompt.contains("t:slim X2"));
    }

    #[test]
    fn only_recent_user_turns_are_included() {
        let history = vec![
            Turn::user("one"),
            Turn::assistant("a1"),
            Turn::user("two"),
            Turn::user("three"),
            Turn::user("four"),
        ];
        let prompt = build("now", &history, &[], &retrieved(), None);
        assert!(!prompt.contains("- one"));
        assert!(prompt.contains("- two"));
        assert!(prompt.contains("- four"));
        assert!(!prompt.contains("a1"));
    }
}
