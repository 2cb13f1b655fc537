use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;

/// Safety auditor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Minimum distinguishable source markers in a partially generated
    /// answer before the citation check warns.
    pub min_citations: usize,
    /// Answers shorter than this skip the citation check entirely.
    pub citation_min_answer_chars: usize,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_citations: constants::DEFAULT_MIN_CITATIONS,
            citation_min_answer_chars: constants::DEFAULT_CITATION_MIN_ANSWER_CHARS,
        }
    }
}

impl SafetyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_citations == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "safety.min_citations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
