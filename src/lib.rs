//! Outfit Tunes
//!
//! Turns an outfit photo into a ranked list of Spotify tracks: a vision model
//! describes the style, predicted genres are normalized to catalog tags, and a
//! fixed artist roster is searched for each genre.

pub mod catalog;
pub mod config;
pub mod genres;
pub mod image;
pub mod pipeline;
pub mod server;
pub mod vision;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use image::ImageRecord;
pub use pipeline::{OutfitPipeline, PipelineError, Recommendation};
pub use server::{run_server, RequestsLoggingLevel};
