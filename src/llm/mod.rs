//! Text generation backends
//!
//! Agents only see [`TextGenerator`]; when none is configured they fall back
//! to deterministic templates.

pub mod huggingface;
pub mod mock;
pub mod selector;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use huggingface::HuggingFaceClient;
pub use mock::MockGenerator;
pub use selector::{ModelInfo, ModelSelector, ModelTask, ModelTier};

/// Opaque text-generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier for logs (model id for remote backends)
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Sampling parameters sent with every generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub do_sample: bool,
    pub repetition_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
            do_sample: true,
            repetition_penalty: 1.1,
        }
    }
}
