//! Engine configuration.
//!
//! One immutable [`EngineConfig`] is built at startup (defaults, or TOML),
//! validated once, and handed into each component's constructor by value.
//! Components never read ad hoc globals.

mod blend_config;
mod classifier_config;
mod experiment_config;
mod generation_config;
mod personalization_config;
mod retrieval_config;
mod safety_config;

pub use blend_config::BlendConfig;
pub use classifier_config::ClassifierConfig;
pub use experiment_config::{CohortSplit, ExperimentConfig};
pub use generation_config::GenerationRetryConfig;
pub use personalization_config::PersonalizationConfig;
pub use retrieval_config::RetrievalConfig;
pub use safety_config::SafetyConfig;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::QueryCategory;

/// Root configuration for the decision engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub retrieval: RetrievalConfig,
    pub blend: BlendConfig,
    pub personalization: PersonalizationConfig,
    pub safety: SafetyConfig,
    pub experiments: ExperimentConfig,
    pub generation: GenerationRetryConfig,
}

impl EngineConfig {
    /// Parse from a TOML string. Unknown keys are rejected by validation,
    /// missing sections fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Startup validation. Configuration errors are fatal here, never
    /// tolerated at query time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Every category must have a registered collection mapping. The
        // mapping may be empty (zero results, logged at query time), but a
        // missing key is a startup failure, not a silent empty result.
        for category in QueryCategory::ALL {
            if !self
                .retrieval
                .category_collections
                .contains_key(category.name())
            {
                return Err(ConfigError::MissingCategoryMapping {
                    category: category.name().to_string(),
                });
            }
        }

        self.retrieval.validate()?;
        self.blend.validate()?;
        self.personalization.validate()?;
        self.experiments.validate()?;
        self.generation.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

pub(crate) fn check_unit_range(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold {
            name: name.to_string(),
            value,
            reason: "must be within [0, 1]".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn missing_category_mapping_is_fatal() {
        let mut config = EngineConfig::default();
        config.retrieval.category_collections.remove("personal_data");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCategoryMapping { .. })
        ));
    }

    #[test]
    fn toml_roundtrip_with_partial_sections() {
        let config = EngineConfig::from_toml_str(
            r#"
            [blend]
            sparse_generated_ratio = 0.9

            [generation]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.blend.sparse_generated_ratio, 0.9);
        assert_eq!(config.generation.max_attempts, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.retrieval.top_k, crate::constants::DEFAULT_TOP_K);
    }
}
