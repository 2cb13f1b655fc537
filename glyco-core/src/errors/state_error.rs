/// Persisted per-session state errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read session state: {reason}")]
    ReadFailed { reason: String },

    #[error("failed to write session state: {reason}")]
    WriteFailed { reason: String },

    #[error("corrupt session record at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("audit log append failed: {reason}")]
    AuditAppendFailed { reason: String },
}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        StateError::ReadFailed {
            reason: e.to_string(),
        }
    }
}
