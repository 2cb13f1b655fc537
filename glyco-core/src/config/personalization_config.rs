use serde::{Deserialize, Serialize};

use super::check_unit_range;
use crate::constants;
use crate::errors::ConfigError;

/// Personalization / feedback-learning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizationConfig {
    /// Boost step applied by the very first feedback event.
    pub base_rate: f64,
    /// Regularization: effective rate is `base_rate / (1 + decay_factor·n)`.
    pub decay_factor: f64,
    /// Upper bound on any per-collection boost.
    pub max_boost: f64,
    /// Minimum detection confidence for a device to enter a profile.
    pub min_detection_confidence: f64,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            base_rate: constants::DEFAULT_BOOST_BASE_RATE,
            decay_factor: constants::DEFAULT_BOOST_DECAY_FACTOR,
            max_boost: constants::DEFAULT_MAX_BOOST,
            min_detection_confidence: 0.6,
        }
    }
}

impl PersonalizationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range("personalization.base_rate", self.base_rate)?;
        check_unit_range("personalization.max_boost", self.max_boost)?;
        check_unit_range(
            "personalization.min_detection_confidence",
            self.min_detection_confidence,
        )?;
        if self.decay_factor < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "personalization.decay_factor".to_string(),
                value: self.decay_factor,
                reason: "must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}
