//! Test fixtures: config pointing at the fake upstream, and image files.

use super::constants::*;
use super::upstream::FakeUpstream;
use outfit_tunes::config::{AppConfig, CatalogConfig, CliConfig, FileConfig, VisionConfig};
use outfit_tunes::RequestsLoggingLevel;
use std::path::{Path, PathBuf};

/// CLI side of the config: secrets only, as if read from the environment.
pub fn test_cli_config() -> CliConfig {
    CliConfig {
        openai_api_key: Some(TEST_API_KEY.to_string()),
        spotify_client_id: Some(TEST_CLIENT_ID.to_string()),
        spotify_client_secret: Some(TEST_CLIENT_SECRET.to_string()),
        model: None,
        port: 0,
        logging_level: RequestsLoggingLevel::None,
    }
}

/// File config routing every upstream call to `upstream`, with a two-artist
/// roster to keep the query count small.
pub fn test_file_config(upstream: &FakeUpstream) -> FileConfig {
    FileConfig {
        vision: Some(VisionConfig {
            base_url: Some(upstream.vision_base_url()),
            timeout_sec: Some(5),
            ..Default::default()
        }),
        catalog: Some(CatalogConfig {
            accounts_url: Some(upstream.token_url()),
            api_url: Some(upstream.api_url()),
            timeout_sec: Some(5),
            artists: Some(vec!["Drake".to_string(), "Frank Ocean".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn test_app_config(upstream: &FakeUpstream) -> AppConfig {
    AppConfig::resolve(&test_cli_config(), Some(test_file_config(upstream)))
        .expect("Failed to resolve test config")
}

/// Writes the same settings as [`test_file_config`] as a TOML file.
pub fn write_config_file(dir: &Path, upstream: &FakeUpstream) -> PathBuf {
    let path = dir.join("outfit-tunes.toml");
    let content = format!(
        r#"
[vision]
base_url = "{}"
timeout_sec = 5

[catalog]
accounts_url = "{}"
api_url = "{}"
timeout_sec = 5
artists = ["Drake", "Frank Ocean"]

[genres]
default = "pop"
"#,
        upstream.vision_base_url(),
        upstream.token_url(),
        upstream.api_url()
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

/// Writes a PNG-signed file and returns its path.
pub fn write_image(dir: &Path) -> PathBuf {
    let path = dir.join("outfit.png");
    std::fs::write(&path, PNG_BYTES).expect("Failed to write image");
    path
}
