//! Artist × genre fan-out over the catalog search backend.

use super::auth::AccessToken;
use super::client::TrackSearchBackend;
use super::models::Track;
use super::ranking::rank_tracks;
use crate::genres::NormalizedGenre;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One constrained search: exact artist, exact genre, year range, result
/// limit and market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub artist: String,
    pub genre: NormalizedGenre,
    pub year_from: u16,
    pub year_to: u16,
    pub limit: u32,
    pub market: String,
}

impl SearchQuery {
    /// Value of the `q` parameter, e.g.
    /// `artist:"Drake" genre:"hip-hop" year:2010-2025`.
    pub fn to_query_string(&self) -> String {
        format!(
            "artist:\"{}\" genre:\"{}\" year:{}-{}",
            self.artist,
            self.genre.as_tag(),
            self.year_from,
            self.year_to
        )
    }
}

/// Fixed parameters of every fan-out.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub year_from: u16,
    pub year_to: u16,
    pub per_query_limit: u32,
    pub market: String,
    /// Maximum number of tracks returned after ranking.
    pub result_cap: usize,
    /// Queries in flight at once. 1 means strictly sequential.
    pub concurrency: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            year_from: 2010,
            year_to: 2025,
            per_query_limit: 5,
            market: "US".to_string(),
            result_cap: 20,
            concurrency: 4,
        }
    }
}

pub struct CatalogSearchEngine {
    backend: Arc<dyn TrackSearchBackend>,
    settings: SearchSettings,
}

impl CatalogSearchEngine {
    pub fn new(backend: Arc<dyn TrackSearchBackend>, settings: SearchSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// One query per (artist, genre) pair, artist-major.
    pub fn build_queries(&self, artists: &[String], genres: &[NormalizedGenre]) -> Vec<SearchQuery> {
        artists
            .iter()
            .flat_map(|artist| {
                genres.iter().map(move |genre| SearchQuery {
                    artist: artist.clone(),
                    genre: *genre,
                    year_from: self.settings.year_from,
                    year_to: self.settings.year_to,
                    limit: self.settings.per_query_limit,
                    market: self.settings.market.clone(),
                })
            })
            .collect()
    }

    /// Run the whole fan-out and return the ranked, deduplicated tracks.
    ///
    /// A failing query contributes no tracks and doesn't stop the batch. An
    /// empty return means nothing matched, not that something broke.
    pub async fn search(
        &self,
        token: &AccessToken,
        artists: &[String],
        genres: &[NormalizedGenre],
    ) -> Vec<Track> {
        let queries = self.build_queries(artists, genres);
        let query_count = queries.len();

        info!(
            artists = artists.len(),
            genres = genres.len(),
            queries = query_count,
            "Searching catalog"
        );

        // `buffered` yields in issue order regardless of completion order, and
        // everything is collected before ranking.
        let per_query: Vec<Vec<Track>> = stream::iter(queries)
            .map(|query| async move { self.run_query(token, query).await })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let empty_queries = per_query.iter().filter(|tracks| tracks.is_empty()).count();
        let all_tracks: Vec<Track> = per_query.into_iter().flatten().collect();

        debug!(
            collected = all_tracks.len(),
            empty_queries,
            "Collected catalog results"
        );

        let ranked = rank_tracks(all_tracks, self.settings.result_cap);
        info!(tracks = ranked.len(), "Ranked catalog results");
        ranked
    }

    async fn run_query(&self, token: &AccessToken, query: SearchQuery) -> Vec<Track> {
        match self.backend.search_tracks(token, &query).await {
            Ok(tracks) => {
                debug!(
                    artist = %query.artist,
                    genre = %query.genre,
                    tracks = tracks.len(),
                    "Search query returned"
                );
                tracks
            }
            Err(e) => {
                warn!(
                    artist = %query.artist,
                    genre = %query.genre,
                    error = %e,
                    "Search query failed, skipping"
                );
                Vec::new()
            }
        }
    }
}
