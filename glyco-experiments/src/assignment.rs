use tracing::debug;

use glyco_core::config::ExperimentConfig;
use glyco_core::models::{Cohort, ExperimentAssignment, ThresholdOverride};
use glyco_core::SessionHash;

/// Assigns sessions to experiment cohorts and resolves the threshold
/// override the assigned cohort carries.
pub struct ExperimentManager {
    config: ExperimentConfig,
}

impl ExperimentManager {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.splits.is_empty()
    }

    /// Deterministic assignment for one session. Hashing the session hash
    /// together with the experiment name decorrelates cohorts across
    /// experiments: the same session can be control in one and treatment
    /// in another.
    pub fn assign(&self, session_hash: &SessionHash) -> Option<ExperimentAssignment> {
        if !self.is_enabled() {
            return None;
        }
        let bucket = bucket_for(session_hash, &self.config.experiment_name);
        let cohort = self.cohort_for_bucket(bucket)?;
        debug!(
            experiment = %self.config.experiment_name,
            bucket,
            cohort = cohort.name(),
            "experiment assignment"
        );
        Some(ExperimentAssignment {
            session_hash: session_hash.clone(),
            experiment_name: self.config.experiment_name.clone(),
            cohort,
        })
    }

    /// The blending override for an assignment, if its cohort carries one.
    pub fn override_for(&self, assignment: &ExperimentAssignment) -> Option<ThresholdOverride> {
        self.config.override_for(assignment.cohort)
    }

    fn cohort_for_bucket(&self, bucket: u8) -> Option<Cohort> {
        let mut upper = 0u32;
        for split in &self.config.splits {
            upper += split.percent as u32;
            if (bucket as u32) < upper {
                return Some(split.cohort);
            }
        }
        // Unreachable when splits sum to 100; validate() enforces that.
        None
    }
}

/// Bucket in `0..100` from the first eight bytes of
/// `blake3(session_hash ":" experiment_name)`.
fn bucket_for(session_hash: &SessionHash, experiment_name: &str) -> u8 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(session_hash.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(experiment_name.as_bytes());
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    (u64::from_be_bytes(prefix) % 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyco_core::config::CohortSplit;

    fn enabled_config() -> ExperimentConfig {
        ExperimentConfig {
            enabled: true,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn assignment_is_deterministic() {
        let manager = ExperimentManager::new(enabled_config());
        let session = SessionHash::from_raw("user-42");
        let first = manager.assign(&session).unwrap();
        for _ in 0..10 {
            assert_eq!(manager.assign(&session).unwrap().cohort, first.cohort);
        }
    }

    #[test]
    fn disabled_config_assigns_nothing() {
        let manager = ExperimentManager::new(ExperimentConfig::default());
        assert!(manager.assign(&SessionHash::from_raw("user-42")).is_none());
    }

    #[test]
    fn experiment_name_decorrelates_cohorts() {
        let a = ExperimentManager::new(enabled_config());
        let mut other = enabled_config();
        other.experiment_name = "citation_floor_v2".to_string();
        let b = ExperimentManager::new(other);

        // At least one of many sessions must land differently.
        let differs = (0..64).any(|i| {
            let session = SessionHash::from_raw(&format!("user-{i}"));
            a.assign(&session).unwrap().cohort != b.assign(&session).unwrap().cohort
        });
        assert!(differs);
    }

    #[test]
    fn split_proportions_hold_over_many_sessions() {
        let manager = ExperimentManager::new(enabled_config());
        let total = 10_000;
        let treatment = (0..total)
            .filter(|i| {
                let session = SessionHash::from_raw(&format!("session-{i}"));
                manager.assign(&session).unwrap().cohort == Cohort::Treatment
            })
            .count();
        // 50/50 split; allow five points of slack either way.
        assert!((4_500..=5_500).contains(&treatment), "treatment = {treatment}");
    }

    #[test]
    fn skewed_split_respects_bucket_boundaries() {
        let config = ExperimentConfig {
            enabled: true,
            splits: vec![
                CohortSplit {
                    cohort: Cohort::Control,
                    percent: 90,
                },
                CohortSplit {
                    cohort: Cohort::Treatment,
                    percent: 10,
                },
            ],
            ..enabled_config()
        };
        let manager = ExperimentManager::new(config);
        let treatment = (0..10_000)
            .filter(|i| {
                let session = SessionHash::from_raw(&format!("session-{i}"));
                manager.assign(&session).unwrap().cohort == Cohort::Treatment
            })
            .count();
        assert!((700..=1_300).contains(&treatment), "treatment = {treatment}");
    }
}
