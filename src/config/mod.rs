mod file_config;

pub use file_config::{CatalogConfig, FileConfig, GenresConfig, ServerFileConfig, VisionConfig};

use crate::catalog::auth::SPOTIFY_TOKEN_URL;
use crate::catalog::client::SPOTIFY_API_BASE;
use crate::catalog::{ClientCredentials, SearchSettings};
use crate::genres::{default_mapping, GenreVocabulary, NormalizedGenre};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_VISION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_VISION_MODEL: &str = "o4-mini-2025-04-16";

/// Maximum `limit` accepted by the Spotify search endpoint.
const MAX_PER_QUERY_LIMIT: u32 = 50;

pub fn default_artists() -> Vec<String> {
    [
        "Kanye West",
        "Frank Ocean",
        "ASAP Rocky",
        "Kendrick Lamar",
        "J. Cole",
        "Drake",
    ]
    .iter()
    .map(|a| a.to_string())
    .collect()
}

/// CLI arguments that can be used for config resolution.
/// Secrets only come from here (flags or environment), never from TOML.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub openai_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub model: Option<String>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub vision: VisionSettings,
    pub catalog: CatalogSettings,
    pub genres: GenreVocabulary,
    pub server: ServerConfig,
}

#[derive(Clone)]
pub struct VisionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for VisionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub accounts_url: String,
    pub api_url: String,
    pub credentials: ClientCredentials,
    pub timeout: Duration,
    pub search: SearchSettings,
    pub artists: Vec<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let api_key = required_secret(&cli.openai_api_key, "OPENAI_API_KEY", "--openai-api-key")?;
        let client_id = required_secret(
            &cli.spotify_client_id,
            "SPOTIFY_CLIENT_ID",
            "--spotify-client-id",
        )?;
        let client_secret = required_secret(
            &cli.spotify_client_secret,
            "SPOTIFY_CLIENT_SECRET",
            "--spotify-client-secret",
        )?;

        let vision_file = file.vision.unwrap_or_default();
        let vision = VisionSettings {
            base_url: vision_file
                .base_url
                .unwrap_or_else(|| DEFAULT_VISION_BASE_URL.to_string()),
            model: vision_file
                .model
                .or_else(|| cli.model.clone())
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            api_key,
            max_tokens: vision_file.max_tokens.unwrap_or(512),
            timeout: Duration::from_secs(vision_file.timeout_sec.unwrap_or(60)),
        };
        if vision.max_tokens == 0 {
            bail!("vision.max_tokens must be greater than 0");
        }

        let catalog_file = file.catalog.unwrap_or_default();
        let defaults = SearchSettings::default();
        let search = SearchSettings {
            year_from: catalog_file.year_from.unwrap_or(defaults.year_from),
            year_to: catalog_file.year_to.unwrap_or(defaults.year_to),
            per_query_limit: catalog_file
                .per_query_limit
                .unwrap_or(defaults.per_query_limit),
            market: catalog_file.market.unwrap_or(defaults.market),
            result_cap: catalog_file.result_cap.unwrap_or(defaults.result_cap),
            concurrency: catalog_file.concurrency.unwrap_or(defaults.concurrency),
        };
        if search.year_from > search.year_to {
            bail!(
                "catalog.year_from ({}) is after catalog.year_to ({})",
                search.year_from,
                search.year_to
            );
        }
        if search.per_query_limit == 0 || search.per_query_limit > MAX_PER_QUERY_LIMIT {
            bail!(
                "catalog.per_query_limit must be between 1 and {}",
                MAX_PER_QUERY_LIMIT
            );
        }
        if search.result_cap == 0 {
            bail!("catalog.result_cap must be greater than 0");
        }
        if search.concurrency == 0 {
            bail!("catalog.concurrency must be greater than 0");
        }

        let artists = catalog_file.artists.unwrap_or_else(default_artists);
        if artists.is_empty() {
            bail!("catalog.artists must list at least one artist");
        }

        let catalog = CatalogSettings {
            accounts_url: catalog_file
                .accounts_url
                .unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string()),
            api_url: catalog_file
                .api_url
                .unwrap_or_else(|| SPOTIFY_API_BASE.to_string()),
            credentials: ClientCredentials::new(client_id, client_secret),
            timeout: Duration::from_secs(catalog_file.timeout_sec.unwrap_or(15)),
            search,
            artists,
        };

        let genres_file = file.genres.unwrap_or_default();
        let mapping: Vec<(String, NormalizedGenre)> = match genres_file.mapping {
            Some(mapping) => mapping.into_iter().collect(),
            None => default_mapping(),
        };
        let genres = GenreVocabulary::new(
            mapping,
            genres_file.default.unwrap_or(NormalizedGenre::HipHop),
        );

        let server_file = file.server.unwrap_or_default();
        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            port: server_file.port.unwrap_or(cli.port),
            max_upload_bytes: server_file
                .max_upload_bytes
                .unwrap_or(server_defaults.max_upload_bytes),
            requests_logging_level: server_file
                .logging_level
                .and_then(|s| parse_logging_level(&s))
                .unwrap_or_else(|| cli.logging_level.clone()),
        };

        Ok(Self {
            vision,
            catalog,
            genres,
            server,
        })
    }
}

fn required_secret(value: &Option<String>, env_var: &str, flag: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => bail!("{} must be set (environment) or passed via {}", env_var, flag),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
