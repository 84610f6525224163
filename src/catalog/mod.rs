//! Spotify catalog access: client-credentials auth, the search endpoint and
//! the artist × genre fan-out with popularity ranking.

pub mod auth;
pub mod client;
mod models;
pub mod ranking;
pub mod search;

pub use auth::{AccessToken, AuthError, ClientCredentials, SpotifyAuth, TokenProvider};
pub use client::{SearchError, SpotifyClient, TrackSearchBackend};
pub use models::Track;
pub use ranking::rank_tracks;
pub use search::{CatalogSearchEngine, SearchQuery, SearchSettings};
