use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::LlmResult;

/// Incremental text produced by a generative-text service.
pub type TextStream = BoxStream<'static, LlmResult<String>>;

/// A system instruction plus the prompt to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            prompt: prompt.into(),
        }
    }
}

/// A service that streams generated text.
///
/// The returned stream ends on natural completion; an `Err` item is an
/// unrecoverable failure of the stream.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn stream_text(&self, request: GenerationRequest) -> LlmResult<TextStream>;
}
