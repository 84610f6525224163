use serde::{Deserialize, Serialize};

/// A track suggestion. Identity is the exact `(name, artist)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub url: String,
    pub popularity: u32,
}

impl Track {
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.artist)
    }
}

// Spotify Web API payloads

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPage {
    /// The API may return `null` entries in place of unavailable tracks.
    #[serde(default)]
    pub items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpotifyTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub popularity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExternalUrls {
    pub spotify: Option<String>,
}

impl SpotifyTrack {
    /// Flatten to a [`Track`] using the first credited artist.
    ///
    /// Items without a name, an artist or a canonical URL can't be presented
    /// and are skipped.
    pub fn into_track(self) -> Option<Track> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let artist = self.artists.into_iter().next()?.name;
        let url = self.external_urls.spotify?;
        Some(Track {
            name,
            artist,
            url,
            popularity: self.popularity.unwrap_or(0),
        })
    }
}

impl SearchResponse {
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .map(|page| {
                page.items
                    .into_iter()
                    .flatten()
                    .filter_map(SpotifyTrack::into_track)
                    .collect()
            })
            .unwrap_or_default()
    }
}
