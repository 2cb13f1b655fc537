use serde::{Deserialize, Serialize};

use super::check_unit_range;
use crate::constants;
use crate::errors::ConfigError;

/// Query classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Two distinct categories both clearing this score → Hybrid.
    pub hybrid_threshold: f64,
    /// Secondary categories must score within this band of the winner.
    pub secondary_band: f64,
    /// How many trailing history turns contribute matchable text.
    pub history_window: usize,
    /// Weight applied to history matches relative to query matches.
    pub history_weight: f64,
    /// Whether an unmatched query is sent to the model for classification.
    pub model_fallback_enabled: bool,
    /// Confidence assigned when the model fallback output cannot be parsed.
    pub fallback_parse_failure_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            hybrid_threshold: constants::DEFAULT_HYBRID_THRESHOLD,
            secondary_band: constants::SECONDARY_CATEGORY_BAND,
            history_window: 4,
            history_weight: 0.5,
            model_fallback_enabled: true,
            fallback_parse_failure_confidence: 0.3,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range("classifier.hybrid_threshold", self.hybrid_threshold)?;
        check_unit_range("classifier.secondary_band", self.secondary_band)?;
        check_unit_range("classifier.history_weight", self.history_weight)?;
        check_unit_range(
            "classifier.fallback_parse_failure_confidence",
            self.fallback_parse_failure_confidence,
        )?;
        Ok(())
    }
}
