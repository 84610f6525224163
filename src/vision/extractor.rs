//! Structured outfit extraction through a vision model.

use super::llm::{
    CompletionOptions, ContentPart, FinishReason, LlmError, LlmProvider, Message,
};
use super::models::ExtractionResult;
use super::parse::ParserChain;
use super::prompt::{format_instructions, VISION_PROMPT};
use crate::image::ImageRecord;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by [`VisionExtractor::extract`]. All of them are fatal for
/// the current request; no retry is attempted.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Model returned empty output (likely token limit exceeded or bad input)")]
    Empty,

    #[error("Model output is not valid JSON:\n{raw}")]
    Malformed { raw: String },

    #[error("Vision model request failed: {0}")]
    Model(#[from] LlmError),
}

/// Sends the outfit photo to a vision model and recovers an
/// [`ExtractionResult`] from its answer.
pub struct VisionExtractor {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    parser: ParserChain,
}

impl VisionExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self {
            provider,
            options,
            parser: ParserChain::default(),
        }
    }

    /// Replace the default strict-then-brace parse chain.
    pub fn with_parser(mut self, parser: ParserChain) -> Self {
        self.parser = parser;
        self
    }

    /// Build the single user message: prompt, schema instructions, image.
    pub fn build_request(image: &ImageRecord) -> Vec<Message> {
        vec![Message::user_parts(vec![
            ContentPart::Text(VISION_PROMPT.to_string()),
            ContentPart::Text(format_instructions()),
            ContentPart::ImageUrl(image.data_uri()),
        ])]
    }

    pub async fn extract(&self, image: &ImageRecord) -> Result<ExtractionResult, ExtractionError> {
        let messages = Self::build_request(image);

        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            image_bytes = image.len(),
            mime_type = image.mime_type(),
            "Analyzing outfit"
        );

        let response = self.provider.complete(&messages, &self.options).await?;

        if response.finish_reason == FinishReason::MaxTokens {
            warn!(
                max_tokens = ?self.options.max_tokens,
                "Model hit the output token cap, answer may be truncated"
            );
        }

        self.parse_output(&response.message.text())
    }

    /// Apply the empty check and the parse chain to raw model text.
    pub fn parse_output(&self, raw: &str) -> Result<ExtractionResult, ExtractionError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(ExtractionError::Empty);
        }

        match self.parser.parse(text) {
            Some(result) => {
                debug!(
                    genres = ?result.music_genre,
                    people_count = result.people_count,
                    "Extracted outfit analysis"
                );
                Ok(result)
            }
            None => {
                warn!(length = text.len(), "Model output could not be parsed");
                Err(ExtractionError::Malformed {
                    raw: text.to_string(),
                })
            }
        }
    }
}
