use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

/// Knowledge-source category a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Curated clinical guideline collections (ADA standards and similar).
    ClinicalGuidelines,
    /// Documents the user uploaded themselves (device manuals, reports).
    UserSources,
    /// General curated knowledge base.
    KnowledgeBase,
    /// The user's own data (readings, device settings).
    PersonalData,
    /// Query spans multiple categories; fan retrieval out to all of them.
    Hybrid,
    /// Nothing matched, or the query was empty/unparseable.
    Unknown,
}

impl QueryCategory {
    /// All routable categories, in collection-priority order.
    pub const ALL: [QueryCategory; 6] = [
        QueryCategory::ClinicalGuidelines,
        QueryCategory::UserSources,
        QueryCategory::KnowledgeBase,
        QueryCategory::PersonalData,
        QueryCategory::Hybrid,
        QueryCategory::Unknown,
    ];

    /// Categories where a wrong answer has direct dosing/safety impact.
    /// These get the precomposed safe fallback on generation exhaustion.
    pub fn is_safety_sensitive(self) -> bool {
        matches!(
            self,
            QueryCategory::ClinicalGuidelines | QueryCategory::PersonalData
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            QueryCategory::ClinicalGuidelines => "clinical_guidelines",
            QueryCategory::UserSources => "user_sources",
            QueryCategory::KnowledgeBase => "knowledge_base",
            QueryCategory::PersonalData => "personal_data",
            QueryCategory::Hybrid => "hybrid",
            QueryCategory::Unknown => "unknown",
        }
    }
}

/// Result of classifying one query. Immutable; produced once per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: QueryCategory,
    pub confidence: Confidence,
    /// Categories within the secondary band of the winner, confidence
    /// descending. Drives multi-collection fan-out for hybrid queries.
    pub secondary_categories: Vec<QueryCategory>,
    /// Human-readable trace of which rule group (or fallback) decided.
    pub reasoning: String,
}

impl Classification {
    /// Classification for an empty or whitespace-only query.
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self {
            category: QueryCategory::Unknown,
            confidence: Confidence::zero(),
            secondary_categories: Vec::new(),
            reasoning: reasoning.into(),
        }
    }

    /// Every category retrieval should consult: the primary plus secondaries.
    pub fn fanout_categories(&self) -> Vec<QueryCategory> {
        let mut cats = vec![self.category];
        for c in &self.secondary_categories {
            if !cats.contains(c) {
                cats.push(*c);
            }
        }
        cats
    }
}
