use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glyco_core::errors::StateError;
use glyco_core::models::{AssignmentRecord, SafetyEventRecord};
use glyco_core::traits::IAuditSink;

/// Append-only JSON-lines audit logs on local disk.
///
/// One file per record type under the sink root. Rows are only ever
/// appended; schema changes must stay additive so old rows keep parsing.
pub struct JsonlAuditSink {
    assignments: Mutex<File>,
    safety_events: Mutex<File>,
    root: PathBuf,
}

impl JsonlAuditSink {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StateError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StateError::WriteFailed {
            reason: format!("create {}: {e}", root.display()),
        })?;
        Ok(Self {
            assignments: Mutex::new(open_append(&root.join("assignments.jsonl"))?),
            safety_events: Mutex::new(open_append(&root.join("safety_events.jsonl"))?),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn append<T: serde::Serialize>(file: &Mutex<File>, record: &T) -> Result<(), StateError> {
        let mut line = serde_json::to_vec(record).map_err(|e| StateError::AuditAppendFailed {
            reason: format!("serialize: {e}"),
        })?;
        line.push(b'\n');
        let mut guard = file.lock().map_err(|_| StateError::AuditAppendFailed {
            reason: "log mutex poisoned".to_string(),
        })?;
        guard
            .write_all(&line)
            .map_err(|e| StateError::AuditAppendFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

impl IAuditSink for JsonlAuditSink {
    fn record_assignment(&self, record: &AssignmentRecord) -> Result<(), StateError> {
        Self::append(&self.assignments, record)
    }

    fn record_safety_event(&self, record: &SafetyEventRecord) -> Result<(), StateError> {
        Self::append(&self.safety_events, record)
    }
}

fn open_append(path: &Path) -> Result<File, StateError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StateError::WriteFailed {
            reason: format!("open {}: {e}", path.display()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use glyco_core::models::{Cohort, Coverage, Verdict, ViolationKind};
    use glyco_core::SessionHash;
    use uuid::Uuid;

    fn sample_assignment() -> AssignmentRecord {
        AssignmentRecord {
            query_id: Uuid::new_v4(),
            session_hash: SessionHash::from_raw("user-1"),
            experiment_name: "blend_thresholds_v1".to_string(),
            cohort: Cohort::Control,
            category: "knowledge_base".to_string(),
            coverage: Coverage::Sufficient,
            chunk_count: 4,
            verdict: Verdict::Allow,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn rows_append_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        {
            let sink = JsonlAuditSink::open(dir.path()).unwrap();
            sink.record_assignment(&sample_assignment()).unwrap();
        }
        {
            let sink = JsonlAuditSink::open(dir.path()).unwrap();
            sink.record_assignment(&sample_assignment()).unwrap();
        }
        let contents = fs::read_to_string(dir.path().join("assignments.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
        for line in contents.lines() {
            let parsed: AssignmentRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.experiment_name, "blend_thresholds_v1");
        }
    }

    #[test]
    fn safety_events_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::open(dir.path()).unwrap();
        let record = SafetyEventRecord {
            query_id: Uuid::new_v4(),
            session_hash: None,
            verdict: Verdict::Block,
            violation_kinds: vec![ViolationKind::DosingInstruction],
            answer_chars: 120,
            timestamp: Utc::now(),
        };
        sink.record_safety_event(&record).unwrap();
        let contents = fs::read_to_string(dir.path().join("safety_events.jsonl")).unwrap();
        let parsed: SafetyEventRecord = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(parsed.verdict, Verdict::Block);
    }
}
