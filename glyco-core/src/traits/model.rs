use serde::{Deserialize, Serialize};

use crate::errors::GlycoResult;

/// Sampling parameters forwarded to the generative model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 1024,
        }
    }
}

/// A finite, non-restartable sequence of answer chunks.
pub type TextStream = Box<dyn Iterator<Item = GlycoResult<String>> + Send>;

/// Generative model collaborator. Retry policy belongs to the engine, not to
/// implementations of this trait; a failed call is returned, not retried.
pub trait IGenerativeModel: Send + Sync {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> GlycoResult<String>;

    fn generate_stream(&self, prompt: &str, config: &GenerationConfig) -> GlycoResult<TextStream>;
}