use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::genres::NormalizedGenre;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub vision: Option<VisionConfig>,
    pub catalog: Option<CatalogConfig>,
    pub genres: Option<GenresConfig>,
    pub server: Option<ServerFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct VisionConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub accounts_url: Option<String>,
    pub api_url: Option<String>,
    pub market: Option<String>,
    pub year_from: Option<u16>,
    pub year_to: Option<u16>,
    pub per_query_limit: Option<u32>,
    pub result_cap: Option<usize>,
    pub timeout_sec: Option<u64>,
    pub concurrency: Option<usize>,
    pub artists: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GenresConfig {
    /// Genre used when no predicted label is recognized.
    pub default: Option<NormalizedGenre>,
    /// Replaces the built-in label table when present.
    pub mapping: Option<BTreeMap<String, NormalizedGenre>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
    pub logging_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
