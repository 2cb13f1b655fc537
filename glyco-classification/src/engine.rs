//! ClassifierEngine: the `classify(query, history)` contract.
//!
//! Deterministic for fixed inputs: the rule table is static, history
//! weighting is arithmetic, and the model fallback only runs when no rule
//! group fires at all.

use std::sync::Arc;
use tracing::debug;

use glyco_core::config::ClassifierConfig;
use glyco_core::models::{Classification, QueryCategory, Role, Turn};
use glyco_core::traits::IGenerativeModel;
use glyco_core::Confidence;

use crate::model_fallback;
use crate::rules::{default_rule_groups, RuleGroup};

/// A rule group's score against one query.
struct GroupScore {
    group: &'static RuleGroup,
    score: f64,
}

pub struct ClassifierEngine {
    config: ClassifierConfig,
    rules: &'static [RuleGroup],
    /// Optional fallback for queries no rule group matches.
    fallback_model: Option<Arc<dyn IGenerativeModel>>,
}

impl ClassifierEngine {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            rules: default_rule_groups(),
            fallback_model: None,
        }
    }

    /// Attach the model used for fallback classification.
    pub fn with_fallback_model(mut self, model: Arc<dyn IGenerativeModel>) -> Self {
        self.fallback_model = Some(model);
        self
    }

    /// Classify a query with its short conversation history.
    pub fn classify(&self, query: &str, history: &[Turn]) -> Classification {
        let query = query.trim();
        if query.is_empty() {
            return Classification::unknown("empty query");
        }

        let history_text = self.history_text(history);
        let scores = self.score_groups(query, &history_text);

        if scores.is_empty() {
            debug!("no rule group matched, delegating to model fallback");
            return self.fallback(query);
        }

        let classification = self.decide(&scores);
        debug!(
            category = classification.category.name(),
            confidence = %classification.confidence,
            reasoning = %classification.reasoning,
            "classified query"
        );
        classification
    }

    /// Last N user turns, concatenated. Assistant turns are skipped: they
    /// echo our own phrasing and would self-reinforce rule matches.
    fn history_text(&self, history: &[Turn]) -> String {
        history
            .iter()
            .rev()
            .filter(|t| t.role == Role::User)
            .take(self.config.history_window)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Score every group. History matches contribute at reduced weight, and
    /// a group matched only in history is discounted as a whole.
    fn score_groups(&self, query: &str, history_text: &str) -> Vec<GroupScore> {
        let mut scores = Vec::new();
        for group in self.rules {
            let query_terms = group.matched_terms(query);
            let history_terms = if history_text.is_empty() {
                None
            } else {
                group.matched_terms(history_text)
            };

            let score = match (query_terms, history_terms) {
                (Some(q), Some(h)) => {
                    group.score(q as f64 + h as f64 * self.config.history_weight)
                }
                (Some(q), None) => group.score(q as f64),
                (None, Some(h)) => group.score(h as f64) * self.config.history_weight,
                (None, None) => continue,
            };
            scores.push(GroupScore { group, score });
        }
        scores
    }

    fn decide(&self, scores: &[GroupScore]) -> Classification {
        // Hybrid: two or more distinct categories clearing the threshold.
        let mut high_categories: Vec<(QueryCategory, f64)> = Vec::new();
        for s in scores {
            if s.score >= self.config.hybrid_threshold
                && !high_categories.iter().any(|(c, _)| *c == s.group.category)
            {
                high_categories.push((s.group.category, s.score));
            }
        }

        if high_categories.len() >= 2 {
            high_categories
                .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            let top_score = high_categories[0].1;
            return Classification {
                category: QueryCategory::Hybrid,
                confidence: Confidence::new(top_score),
                secondary_categories: high_categories.iter().map(|(c, _)| *c).collect(),
                reasoning: format!(
                    "hybrid: {} categories above {:.2}",
                    high_categories.len(),
                    self.config.hybrid_threshold
                ),
            };
        }

        // Otherwise: first group in priority order clearing its floor wins.
        let winner = scores.iter().find(|s| s.score >= s.group.floor);
        let Some(winner) = winner else {
            // Matches exist but none cleared a floor; treat as unmatched.
            return Classification {
                category: QueryCategory::KnowledgeBase,
                confidence: Confidence::new(
                    scores
                        .iter()
                        .map(|s| s.score)
                        .fold(0.0, f64::max),
                ),
                secondary_categories: Vec::new(),
                reasoning: "no rule group cleared its floor".to_string(),
            };
        };

        // Secondary categories: within the band of the winner, descending.
        let mut secondaries: Vec<(QueryCategory, f64)> = scores
            .iter()
            .filter(|s| {
                s.group.category != winner.group.category
                    && winner.score - s.score <= self.config.secondary_band
            })
            .map(|s| (s.group.category, s.score))
            .collect();
        secondaries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        secondaries.dedup_by_key(|(c, _)| *c);

        Classification {
            category: winner.group.category,
            confidence: Confidence::new(winner.score),
            secondary_categories: secondaries.into_iter().map(|(c, _)| c).collect(),
            reasoning: format!("rule group '{}'", winner.group.name),
        }
    }

    fn fallback(&self, query: &str) -> Classification {
        if !self.config.model_fallback_enabled {
            return Classification::unknown("no rule match, fallback disabled");
        }
        match &self.fallback_model {
            Some(model) => model_fallback::classify_via_model(
                model.as_ref(),
                query,
                self.config.fallback_parse_failure_confidence,
            ),
            None => Classification::unknown("no rule match, no fallback model"),
        }
    }
}
