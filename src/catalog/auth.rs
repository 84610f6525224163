//! Spotify client-credentials token exchange.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Errors from the token exchange. Any of them means the search stage must
/// not run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    #[error("Token request timed out")]
    Timeout,

    #[error("Token request rejected with status {status}")]
    Rejected { status: u16 },

    #[error("Token response did not contain an access token")]
    MissingToken,
}

/// Opaque bearer token. Expiry is not tracked: one token is fetched per
/// top-level request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `Basic` authorization header value: base64 of `id:secret`.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Source of bearer tokens for catalog queries.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client-credentials grant against the Spotify accounts service.
pub struct SpotifyAuth {
    client: Client,
    token_url: String,
    credentials: ClientCredentials,
}

impl SpotifyAuth {
    pub fn new(
        token_url: impl Into<String>,
        credentials: ClientCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token_url: token_url.into(),
            credentials,
        })
    }
}

#[async_trait]
impl TokenProvider for SpotifyAuth {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        debug!(url = %self.token_url, "Requesting catalog access token");

        let response = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else {
                    AuthError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Token response is not valid JSON");
                return Err(AuthError::MissingToken);
            }
        };

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(AuthError::MissingToken),
        }
    }
}
