//! # glyco-personalization
//!
//! Per-session personalization: detects a user's registered devices from
//! uploaded documents, applies a bounded confidence boost to retrieval
//! results from matching collections, and learns that boost from
//! thumbs-up/down feedback with a regularized (decaying) learning rate.

pub mod devices;
mod engine;
mod store;

pub use engine::{Feedback, PersonalizationEngine};
pub use store::JsonSessionStore;
