//! Outfit analysis through a vision-capable LLM.
//!
//! - `llm`: provider abstraction and the OpenAI-compatible client
//! - `prompt`: behavioral prompt and schema instructions
//! - `parse`: strict-then-brace-extraction parse chain
//! - `extractor`: request composition and output validation

mod extractor;
pub mod llm;
mod models;
pub mod parse;
pub mod prompt;

pub use extractor::{ExtractionError, VisionExtractor};
pub use models::ExtractionResult;
pub use parse::{BraceExtraction, ParseStrategy, ParserChain, StrictJson};
