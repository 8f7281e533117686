//! Generative-text service access
//!
//! - [`TextGenerator`]: transport-independent contract yielding an async
//!   stream of text increments
//! - [`OpenRouterClient`]: OpenRouter chat-completions implementation using SSE

pub mod client;
pub mod error;
pub mod generator;
pub mod types;

pub use client::OpenRouterClient;
pub use error::{LlmError, LlmResult};
pub use generator::{GenerationRequest, TextGenerator, TextStream};
pub use types::{ChatMessage, Role};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
