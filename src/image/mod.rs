//! Image payloads sent to the vision model.
//!
//! An [`ImageRecord`] lives for a single request: it is built from an upload
//! or a file on disk, encoded once for the model request and then dropped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use thiserror::Error;

/// MIME type assumed when the bytes don't match any known image signature.
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image is empty")]
    Empty,

    #[error("Unsupported content type: {0}")]
    NotAnImage(String),
}

/// Raw image bytes plus the MIME type sniffed from them.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageRecord {
    /// Build a record from raw bytes.
    ///
    /// Bytes with a recognized non-image signature (e.g. a PDF) are rejected.
    /// Unrecognized bytes are accepted and labelled as JPEG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let mime_type = match infer::get(&bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                kind.mime_type().to_string()
            }
            Some(kind) => return Err(ImageError::NotAnImage(kind.mime_type().to_string())),
            None => FALLBACK_MIME_TYPE.to_string(),
        };

        Ok(Self { bytes, mime_type })
    }

    /// Read an image from disk.
    pub async fn load(path: &Path) -> Result<Self, ImageError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the raw bytes.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URI suitable for an `image_url` content part.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded())
    }
}
