//! # glyco-safety
//!
//! Deterministic, pattern-driven safety auditing of candidate answers.
//! An ordered battery of independent checks produces violations; the most
//! severe single finding decides the verdict. A failing check abstains;
//! it never takes the rest of the battery down with it.

mod auditor;
pub mod checks;
mod context;

pub use auditor::SafetyAuditor;
pub use context::AuditContext;
