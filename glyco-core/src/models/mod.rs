//! Core data model: one file per record family, covering classification,
//! retrieval, blending, personalization, safety, and experimentation.

mod audit_records;
mod boost_state;
mod breakdown;
mod classification;
mod experiment;
mod profile;
mod response;
mod retrieval;
mod safety;
mod turn;

pub use audit_records::{AssignmentRecord, SafetyEventRecord};
pub use boost_state::BoostAdjustmentState;
pub use breakdown::{KnowledgeBreakdown, PrimarySource, ThresholdOverride};
pub use classification::{Classification, QueryCategory};
pub use experiment::{Cohort, ExperimentAssignment};
pub use profile::{OverrideSource, UserDeviceProfile};
pub use response::EngineResponse;
pub use retrieval::{
    CollectionFailure, CollectionFailureKind, Coverage, RetrievalDiagnostics, RetrievalQuality,
    RetrievalResult,
};
pub use safety::{SafetyAuditResult, Verdict, Violation, ViolationKind};
pub use turn::{Role, Turn};
