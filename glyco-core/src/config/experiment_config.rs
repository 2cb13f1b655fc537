use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::{Cohort, ThresholdOverride};

/// One cohort's share of an experiment, in whole percentage points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CohortSplit {
    pub cohort: Cohort,
    pub percent: u8,
}

/// Experimentation configuration. A single named experiment with cumulative
/// percentage splits; splits must sum to exactly 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub enabled: bool,
    pub experiment_name: String,
    pub splits: Vec<CohortSplit>,
    /// Blending-threshold replacement applied to the treatment cohort.
    pub treatment_override: Option<ThresholdOverride>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            experiment_name: "blend_thresholds_v1".to_string(),
            splits: vec![
                CohortSplit {
                    cohort: Cohort::Control,
                    percent: 50,
                },
                CohortSplit {
                    cohort: Cohort::Treatment,
                    percent: 50,
                },
            ],
            treatment_override: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum: u32 = self.splits.iter().map(|s| s.percent as u32).sum();
        if sum != 100 {
            return Err(ConfigError::UnbalancedSplits {
                experiment: self.experiment_name.clone(),
                sum,
            });
        }
        Ok(())
    }

    /// The threshold override for a cohort, if any.
    pub fn override_for(&self, cohort: Cohort) -> Option<ThresholdOverride> {
        match cohort {
            Cohort::Control => None,
            Cohort::Treatment => self.treatment_override,
        }
    }
}
