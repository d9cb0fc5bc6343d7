// src/llm_client/mod.rs
use async_trait::async_trait;

use crate::error::ChatError;

pub mod client;
pub mod types;

pub use client::LocalLlmClient;
pub use types::{Message, Role};

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Sends a conversation to a model and returns the reply text.
///
/// [`LocalLlmClient`] talks to an OpenAI-compatible server over HTTP; the
/// job extractor only depends on this trait.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ChatError>;
}
