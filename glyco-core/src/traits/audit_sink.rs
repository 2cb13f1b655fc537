use crate::errors::StateError;
use crate::models::{AssignmentRecord, SafetyEventRecord};

/// Append-only analysis logs: one row per query assignment, one row per
/// safety event that warned or blocked.
pub trait IAuditSink: Send + Sync {
    fn record_assignment(&self, record: &AssignmentRecord) -> Result<(), StateError>;

    fn record_safety_event(&self, record: &SafetyEventRecord) -> Result<(), StateError>;
}
