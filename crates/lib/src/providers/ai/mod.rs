pub mod gemini;
pub mod openai;

use crate::errors::GenerationError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Per-call generation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Upper bound on the number of tokens the model may produce.
    pub max_tokens: u32,
    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for text generation across different
/// Large Language Model APIs (e.g., OpenAI-compatible endpoints, Gemini).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// A single attempt is made; any upstream fault surfaces as a `GenerationError`.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, GenerationError>;
}

dyn_clone::clone_trait_object!(AiProvider);
