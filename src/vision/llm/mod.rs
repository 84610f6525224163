//! LLM provider abstraction layer.
//!
//! The extractor only needs a single multimodal completion, so the provider
//! trait is kept to that one call.

mod openai;
mod provider;
mod types;

pub use openai::OpenAIProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
#[cfg(feature = "mock")]
pub use provider::MockLlmProvider;
pub use types::{CompletionResponse, ContentPart, FinishReason, Message, MessageRole, TokenUsage};
