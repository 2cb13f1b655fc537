use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;
use crate::traits::GenerationConfig;

/// Retry and budget policy for calls to the generative model. The sampling
/// parameters live in [`GenerationConfig`]; this struct owns the policy the
/// engine wraps around them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRetryConfig {
    pub max_attempts: u32,
    /// Base backoff delay; attempt n waits `base_backoff_ms × 2^n`.
    pub base_backoff_ms: u64,
    /// Overall per-query budget covering classify + retrieve + generate.
    pub query_budget_ms: u64,
    pub sampling: GenerationConfig,
}

impl Default for GenerationRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_GENERATION_MAX_ATTEMPTS,
            base_backoff_ms: constants::DEFAULT_GENERATION_BACKOFF_MS,
            query_budget_ms: constants::DEFAULT_QUERY_BUDGET_MS,
            sampling: GenerationConfig::default(),
        }
    }
}

impl GenerationRetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "generation.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.query_budget_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "generation.query_budget_ms".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
