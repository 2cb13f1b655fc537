/// Generative-model collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model call failed: {reason}")]
    CallFailed { reason: String },

    #[error("model returned empty content")]
    EmptyContent,

    #[error("generation exhausted {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    #[error("query time budget of {budget_ms}ms expired")]
    BudgetExpired { budget_ms: u64 },
}
