use serde::{Deserialize, Serialize};

use crate::session::SessionHash;

/// A randomized experimental group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    Control,
    Treatment,
}

impl Cohort {
    pub fn name(self) -> &'static str {
        match self {
            Cohort::Control => "control",
            Cohort::Treatment => "treatment",
        }
    }
}

/// Deterministic assignment of one session to one experiment cohort.
/// Pure function of `(session_hash, experiment_name)`; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentAssignment {
    pub session_hash: SessionHash,
    pub experiment_name: String,
    pub cohort: Cohort,
}
