use serde::{Deserialize, Serialize};

use super::check_unit_range;
use crate::constants;
use crate::errors::ConfigError;

/// Knowledge blender configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Sufficient-coverage chunk minimum.
    pub sufficient_min_chunks: usize,
    /// Sufficient-coverage average-confidence minimum.
    pub sufficient_min_confidence: f64,
    /// Generated ratio used for sparse retrieval. Must stay at or above 0.7.
    pub sparse_generated_ratio: f64,
    /// Fixed confidence attributed to the model's own knowledge.
    pub generated_knowledge_confidence: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            sufficient_min_chunks: constants::SUFFICIENT_MIN_CHUNKS,
            sufficient_min_confidence: constants::SUFFICIENT_MIN_CONFIDENCE,
            sparse_generated_ratio: constants::SPARSE_GENERATED_RATIO,
            generated_knowledge_confidence: constants::GENERATED_KNOWLEDGE_CONFIDENCE,
        }
    }
}

impl BlendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range(
            "blend.sufficient_min_confidence",
            self.sufficient_min_confidence,
        )?;
        check_unit_range(
            "blend.generated_knowledge_confidence",
            self.generated_knowledge_confidence,
        )?;
        if self.sparse_generated_ratio < 0.7 || self.sparse_generated_ratio > 1.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "blend.sparse_generated_ratio".to_string(),
                value: self.sparse_generated_ratio,
                reason: "must be within [0.7, 1.0]".to_string(),
            });
        }
        if self.sufficient_min_chunks == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "blend.sufficient_min_chunks".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
