//! HTTP client for the Spotify search endpoint.

use super::auth::AccessToken;
use super::models::{SearchResponse, Track};
use super::search::SearchQuery;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Why a single search query contributed nothing. Never surfaced past the
/// search engine; only logged.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized (status {0})")]
    Unauthorized(u16),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// A catalog that can answer one structured track search.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TrackSearchBackend: Send + Sync {
    async fn search_tracks(
        &self,
        token: &AccessToken,
        query: &SearchQuery,
    ) -> Result<Vec<Track>, SearchError>;
}

pub struct SpotifyClient {
    client: Client,
    base_url: String,
}

impl SpotifyClient {
    /// # Arguments
    /// * `base_url` - Base URL of the Web API (e.g., "https://api.spotify.com/v1")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full search URL with the query string for `query`.
    pub fn search_url(&self, query: &SearchQuery) -> Result<Url, SearchError> {
        let limit = query.limit.to_string();
        Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("q", query.to_query_string().as_str()),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("market", query.market.as_str()),
            ],
        )
        .map_err(|e| SearchError::Transport(format!("Invalid search URL: {}", e)))
    }
}

#[async_trait]
impl TrackSearchBackend for SpotifyClient {
    async fn search_tracks(
        &self,
        token: &AccessToken,
        query: &SearchQuery,
    ) -> Result<Vec<Track>, SearchError> {
        let url = self.search_url(query)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => SearchError::RateLimited,
                code @ (401 | 403) => SearchError::Unauthorized(code),
                code => SearchError::Status(code),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(body.into_tracks())
    }
}
