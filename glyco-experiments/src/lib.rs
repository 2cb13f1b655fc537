//! # glyco-experiments
//!
//! Hash-based cohort assignment and the append-only audit sinks behind it.
//! Assignment is a pure function of session hash and experiment name, so a
//! session lands in the same cohort on every query with no stored state.

mod assignment;
mod log;

pub use assignment::ExperimentManager;
pub use log::JsonlAuditSink;
