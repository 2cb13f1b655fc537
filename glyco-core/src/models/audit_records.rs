use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::experiment::Cohort;
use super::retrieval::Coverage;
use super::safety::{Verdict, ViolationKind};
use crate::session::SessionHash;

/// One append-only row per query: experiment assignment plus outcome
/// metrics for offline analysis. Schema is stable and additive-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub query_id: Uuid,
    pub session_hash: SessionHash,
    pub experiment_name: String,
    pub cohort: Cohort,
    pub category: String,
    pub coverage: Coverage,
    pub chunk_count: usize,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

/// One append-only row per safety-audit event that warned or blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyEventRecord {
    pub query_id: Uuid,
    pub session_hash: Option<SessionHash>,
    pub verdict: Verdict,
    pub violation_kinds: Vec<ViolationKind>,
    pub answer_chars: usize,
    pub timestamp: DateTime<Utc>,
}
