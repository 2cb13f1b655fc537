//! # glyco-engine
//!
//! The per-query pipeline: classify, retrieve, blend, generate, audit.
//! Collaborators arrive as trait objects so the whole pipeline runs against
//! in-memory fakes in tests and real backends in production.

mod engine;
mod prompt;
mod telemetry;

pub use engine::GlycoEngine;
pub use telemetry::init_tracing;
