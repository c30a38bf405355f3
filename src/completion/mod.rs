//! Text completion for question generation.

mod anthropic;

pub use anthropic::AnthropicClient;

use crate::error::Result;
use async_trait::async_trait;

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User message.
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait for completion services.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the text of the reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// The model the client talks to.
    fn model(&self) -> &str;
}
