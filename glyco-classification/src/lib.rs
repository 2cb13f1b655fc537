//! # glyco-classification
//!
//! Maps raw query text plus a short conversation history to a knowledge
//! category and confidence. Layered keyword/regex rule groups run first, in
//! fixed priority order; only an unmatched query falls back to the model.

mod engine;
mod model_fallback;
pub mod rules;

pub use engine::ClassifierEngine;
