//! Classification rules as data.
//!
//! Each rule group is a set of compiled matchers with a category and a
//! confidence formula `min(0.95, base + matched_terms × increment)`. Groups
//! are evaluated in the fixed priority order of [`default_rule_groups`] by a
//! single generic scorer, so rules are table edits, not branching code.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::constants::CLASSIFICATION_CONFIDENCE_CAP;
use glyco_core::models::QueryCategory;

macro_rules! rule_regex {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Emergency / safety ─────────────────────────────────────────────────────
rule_regex!(
    RE_EMERGENCY_SYMPTOM,
    r"(?i)\b(unconscious|passed\s+out|seizure|can.?t\s+wake|not\s+breathing|confus(ed|ion)|shak(y|ing)|sweating\s+badly)\b"
);
rule_regex!(RE_EMERGENCY_TREATMENT, r"(?i)\bglucagon\b|\bemergency\b|\b911\b");
rule_regex!(
    RE_EXTREME_GLUCOSE,
    r"(?i)\b(([2-5]\d)|([4-9]\d{2}))\s*(mg/dl)?\b.{0,24}\b(glucose|sugar|bg)\b|\b(glucose|sugar|bg)\b.{0,24}\b(([2-5]\d)|([4-9]\d{2}))\s*(mg/dl)?\b"
);
rule_regex!(
    RE_SEVERE_EPISODE,
    r"(?i)\bsevere\s+(hypo|hyper)(glycemia)?\b|\bdka\b|\bketoacidosis\b"
);

// ── Compound: named food + delayed-effect phrase ───────────────────────────
rule_regex!(
    RE_NAMED_FOOD,
    r"(?i)\b(pizza|pasta|rice|noodles|ice\s*cream|curry|burger|fries|high[-\s]?fat|fatty|protein[-\s]?heavy)\b"
);
rule_regex!(
    RE_DELAYED_EFFECT,
    r"(?i)\b(hours?\s+(later|after)|delayed|overnight|at\s+night|slow\s+rise|second\s+spike|later\s+spike)\b"
);

// ── Device names ───────────────────────────────────────────────────────────
rule_regex!(
    RE_PUMP_NAME,
    r"(?i)\b(t:?slim(\s*x2)?|tandem|omnipod|medtronic|minimed|ypsopump|mobi|insulin\s+pump|pod\b)"
);
rule_regex!(
    RE_CGM_NAME,
    r"(?i)\b(dexcom|g[67]\b|libre|freestyle|guardian|eversense|cgm|sensor)\b"
);
rule_regex!(
    RE_ALGORITHM_NAME,
    r"(?i)\b(control[-\s]?iq|basal[-\s]?iq|smartguard|hybrid\s+closed\s+loop|auto\s*mode)\b"
);

// ── Personal data phrasing ─────────────────────────────────────────────────
rule_regex!(
    RE_MY_DATA,
    r"(?i)\bmy\s+(readings?|data|numbers?|average|glucose\s+history|time\s+in\s+range|reports?|settings?|basal\s+rates?)\b"
);
rule_regex!(
    RE_RECENT_WINDOW,
    r"(?i)\b(yesterday|last\s+(night|week|month)|this\s+morning|past\s+\d+\s+days?)\b"
);

// ── Clinical guideline phrasing ────────────────────────────────────────────
rule_regex!(
    RE_CLINICAL_TERM,
    r"(?i)\b(a1c|hba1c|target\s+range|guidelines?|recommend(ation|ed)?|correction\s+factor|carb\s+ratio|insulin\s+sensitivity|basal|bolus|ketones?|hypoglycemia|hyperglycemia)\b"
);
rule_regex!(
    RE_STANDARDS_BODY,
    r"(?i)\b(ada|american\s+diabetes\s+association|standards\s+of\s+care)\b"
);

// ── Generic domain fallback ────────────────────────────────────────────────
rule_regex!(
    RE_DOMAIN_TERM,
    r"(?i)\b(diabetes|insulin|glucose|blood\s+sugar|carb(ohydrate)?s?|exercise|sick\s+day|dawn\s+phenomenon)\b"
);

/// One prioritized rule group.
pub struct RuleGroup {
    pub name: &'static str,
    pub category: QueryCategory,
    /// Every one of these must match, or the group does not fire.
    /// Empty slice means no compound requirement.
    pub required: &'static [&'static LazyLock<Option<Regex>>],
    /// Each matching pattern here counts as one matched term.
    pub patterns: &'static [&'static LazyLock<Option<Regex>>],
    pub base_confidence: f64,
    pub increment: f64,
    /// The group's score must clear this floor to win outright.
    pub floor: f64,
}

impl RuleGroup {
    /// Count matched terms in `text`. `None` when the group does not fire
    /// (a required pattern missed, or nothing matched at all). A pattern
    /// that failed to compile abstains.
    pub fn matched_terms(&self, text: &str) -> Option<usize> {
        for required in self.required {
            let hit = required
                .as_ref()
                .map(|re| re.is_match(text))
                .unwrap_or(false);
            if !hit {
                return None;
            }
        }
        let hits = self
            .patterns
            .iter()
            .filter(|p| p.as_ref().map(|re| re.is_match(text)).unwrap_or(false))
            .count();
        let total = hits + self.required.len();
        if total == 0 {
            None
        } else {
            Some(total)
        }
    }

    /// Confidence formula: `min(cap, base + matched_terms × increment)`.
    pub fn score(&self, matched_terms: f64) -> f64 {
        (self.base_confidence + matched_terms * self.increment).min(CLASSIFICATION_CONFIDENCE_CAP)
    }
}

/// The fixed-priority rule table. Emergency patterns come first so safety
/// routing is never shadowed by a device or food match.
pub fn default_rule_groups() -> &'static [RuleGroup] {
    static GROUPS: &[RuleGroup] = &[
        RuleGroup {
            name: "emergency_safety",
            category: QueryCategory::ClinicalGuidelines,
            required: &[],
            patterns: &[
                &RE_EMERGENCY_SYMPTOM,
                &RE_EMERGENCY_TREATMENT,
                &RE_EXTREME_GLUCOSE,
                &RE_SEVERE_EPISODE,
            ],
            base_confidence: 0.75,
            increment: 0.05,
            floor: 0.5,
        },
        RuleGroup {
            name: "food_delayed_effect",
            category: QueryCategory::KnowledgeBase,
            required: &[&RE_NAMED_FOOD, &RE_DELAYED_EFFECT],
            patterns: &[],
            base_confidence: 0.7,
            increment: 0.05,
            floor: 0.5,
        },
        RuleGroup {
            name: "device_names",
            category: QueryCategory::UserSources,
            required: &[],
            patterns: &[&RE_PUMP_NAME, &RE_CGM_NAME, &RE_ALGORITHM_NAME],
            base_confidence: 0.68,
            increment: 0.06,
            floor: 0.5,
        },
        RuleGroup {
            name: "personal_data",
            category: QueryCategory::PersonalData,
            required: &[],
            patterns: &[&RE_MY_DATA, &RE_RECENT_WINDOW],
            base_confidence: 0.66,
            increment: 0.06,
            floor: 0.5,
        },
        RuleGroup {
            name: "clinical_guidelines",
            category: QueryCategory::ClinicalGuidelines,
            required: &[],
            patterns: &[&RE_CLINICAL_TERM, &RE_STANDARDS_BODY],
            base_confidence: 0.62,
            increment: 0.06,
            floor: 0.5,
        },
        RuleGroup {
            name: "general_domain",
            category: QueryCategory::KnowledgeBase,
            required: &[],
            patterns: &[&RE_DOMAIN_TERM],
            base_confidence: 0.5,
            increment: 0.04,
            floor: 0.4,
        },
    ];
    GROUPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_group_needs_both_halves() {
        let groups = default_rule_groups();
        let food = groups.iter().find(|g| g.name == "food_delayed_effect").unwrap();
        assert!(food.matched_terms("why does pizza spike me hours later").is_some());
        assert!(food.matched_terms("is pizza bad for me").is_none());
        assert!(food.matched_terms("why a spike hours later").is_none());
    }

    #[test]
    fn score_is_capped() {
        let groups = default_rule_groups();
        let device = groups.iter().find(|g| g.name == "device_names").unwrap();
        assert!(device.score(100.0) <= CLASSIFICATION_CONFIDENCE_CAP);
    }

    #[test]
    fn emergency_group_fires_on_symptoms() {
        let groups = default_rule_groups();
        let emergency = &groups[0];
        assert_eq!(emergency.name, "emergency_safety");
        assert!(emergency
            .matched_terms("my friend passed out and their glucose is 40 mg/dl")
            .is_some());
    }
}
