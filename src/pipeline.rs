//! End-to-end flow for one uploaded photo:
//! image → vision extraction → genre normalization → token → catalog search.

use crate::catalog::{
    AuthError, CatalogSearchEngine, SpotifyAuth, SpotifyClient, TokenProvider, Track,
};
use crate::config::AppConfig;
use crate::genres::{GenreSelection, GenreVocabulary};
use crate::image::{ImageError, ImageRecord};
use crate::vision::llm::{CompletionOptions, OpenAIProvider};
use crate::vision::{ExtractionError, ExtractionResult, VisionExtractor};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Fatal pipeline failures, labelled with the stage that produced them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image stage failed: {0}")]
    Image(#[from] ImageError),

    #[error("Outfit analysis failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Spotify authentication failed: {0}")]
    Authentication(#[from] AuthError),
}

impl PipelineError {
    /// Short stage name for API responses.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Image(_) => "image",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Authentication(_) => "authentication",
        }
    }
}

/// Everything produced for one photo.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub analysis: ExtractionResult,
    pub genres: GenreSelection,
    /// Ranked tracks. Empty means no songs matched; failures are reported as
    /// [`PipelineError`] instead.
    pub tracks: Vec<Track>,
}

impl Recommendation {
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }
}

pub struct OutfitPipeline {
    extractor: VisionExtractor,
    vocabulary: GenreVocabulary,
    token_provider: Arc<dyn TokenProvider>,
    search_engine: CatalogSearchEngine,
    artists: Vec<String>,
}

impl OutfitPipeline {
    pub fn new(
        extractor: VisionExtractor,
        vocabulary: GenreVocabulary,
        token_provider: Arc<dyn TokenProvider>,
        search_engine: CatalogSearchEngine,
        artists: Vec<String>,
    ) -> Self {
        Self {
            extractor,
            vocabulary,
            token_provider,
            search_engine,
            artists,
        }
    }

    /// Wire the production clients (OpenAI-compatible model, Spotify) from
    /// resolved configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = OpenAIProvider::new(
            config.vision.base_url.clone(),
            config.vision.model.clone(),
            Some(config.vision.api_key.clone()),
        );
        let options = CompletionOptions {
            max_tokens: Some(config.vision.max_tokens),
            timeout: config.vision.timeout,
            ..Default::default()
        };

        let auth = SpotifyAuth::new(
            config.catalog.accounts_url.clone(),
            config.catalog.credentials.clone(),
            config.catalog.timeout,
        )
        .context("Failed to build token client")?;
        let client = SpotifyClient::new(config.catalog.api_url.clone(), config.catalog.timeout)
            .context("Failed to build search client")?;

        info!(
            model = %config.vision.model,
            artists = config.catalog.artists.len(),
            "Pipeline configured"
        );

        Ok(Self::new(
            VisionExtractor::new(Arc::new(provider), options),
            config.genres.clone(),
            Arc::new(auth),
            CatalogSearchEngine::new(Arc::new(client), config.catalog.search.clone()),
            config.catalog.artists.clone(),
        ))
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub async fn recommend_file(&self, path: &Path) -> Result<Recommendation, PipelineError> {
        let image = ImageRecord::load(path).await?;
        self.recommend(&image).await
    }

    pub async fn recommend(&self, image: &ImageRecord) -> Result<Recommendation, PipelineError> {
        let started = Instant::now();

        let analysis = self.extractor.extract(image).await?;

        let genres = self.vocabulary.normalize(&analysis.music_genre);
        info!(
            predicted = ?analysis.music_genre,
            normalized = ?genres.genres,
            fallback = genres.used_fallback,
            "Normalized genres"
        );

        // A missing token aborts here; no unauthenticated search is issued.
        let token = self.token_provider.access_token().await?;

        let tracks = self
            .search_engine
            .search(&token, &self.artists, &genres.genres)
            .await;

        info!(
            tracks = tracks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation complete"
        );

        Ok(Recommendation {
            analysis,
            genres,
            tracks,
        })
    }
}
