use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::breakdown::KnowledgeBreakdown;
use super::classification::Classification;
use super::safety::SafetyAuditResult;

/// The `(answer, metadata)` pair every transport layer receives.
///
/// `answer` is never empty: blocked or failed generations are replaced by
/// the precomposed safe fallback before this struct is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub query_id: Uuid,
    pub answer: String,
    pub classification: Classification,
    pub breakdown: KnowledgeBreakdown,
    pub audit: SafetyAuditResult,
}
