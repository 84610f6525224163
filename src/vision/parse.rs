//! Tolerant parsing of the model's free-text answer.
//!
//! Parsing runs an ordered chain of [`ParseStrategy`] tiers. The first tier
//! that yields an [`ExtractionResult`] wins; if none does the text is
//! reported as malformed.

use super::models::ExtractionResult;
use tracing::debug;

/// One way of turning raw model text into an [`ExtractionResult`].
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, raw: &str) -> Option<ExtractionResult>;
}

/// The whole text must be the JSON object.
pub struct StrictJson;

impl ParseStrategy for StrictJson {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn parse(&self, raw: &str) -> Option<ExtractionResult> {
        parse_object(raw)
    }
}

/// Parse the first balanced `{...}` block found in the text, ignoring any
/// chatter or markdown fences around it.
pub struct BraceExtraction;

impl ParseStrategy for BraceExtraction {
    fn name(&self) -> &'static str {
        "brace-extraction"
    }

    fn parse(&self, raw: &str) -> Option<ExtractionResult> {
        let candidate = first_balanced_object(raw)?;
        parse_object(candidate)
    }
}

/// Decodes `text` only if it is a JSON object. serde would otherwise map a
/// JSON array onto the struct fields by position.
fn parse_object(text: &str) -> Option<ExtractionResult> {
    match serde_json::from_str::<serde_json::Value>(text).ok()? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Returns the first top-level `{...}` substring whose braces balance.
///
/// Braces inside JSON string literals are not counted.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Ordered list of strategies tried on every answer.
pub struct ParserChain {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl ParserChain {
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Runs each tier in order and returns the first success.
    pub fn parse(&self, raw: &str) -> Option<ExtractionResult> {
        for strategy in &self.strategies {
            if let Some(result) = strategy.parse(raw) {
                debug!(tier = strategy.name(), "Parsed model output");
                return Some(result);
            }
            debug!(tier = strategy.name(), "Parse tier did not match");
        }
        None
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new(vec![Box::new(StrictJson), Box::new(BraceExtraction)])
    }
}
