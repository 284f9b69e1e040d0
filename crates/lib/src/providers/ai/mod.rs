pub mod embedding;
pub mod gemini;
pub mod local;
pub mod sentiment;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a generative AI provider.
///
/// This defines a common interface for composing answers with different
/// Large Language Models (e.g., Gemini, an OpenAI-compatible host).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(AiProvider);
