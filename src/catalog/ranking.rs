//! Ordering and de-duplication of search results by popularity.

use super::models::Track;
use std::collections::HashSet;

/// Rank a collected batch of tracks.
///
/// Sorts by popularity descending (stable, so ties keep collection order),
/// then keeps the first occurrence of each `(name, artist)` pair and
/// truncates to `cap`. Sorting happens before deduplication, so the most
/// popular copy of a duplicate always wins.
pub fn rank_tracks(mut tracks: Vec<Track>, cap: usize) -> Vec<Track> {
    tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut ranked = Vec::with_capacity(cap.min(tracks.len()));
    for track in tracks {
        if ranked.len() == cap {
            break;
        }
        if seen.insert((track.name.clone(), track.artist.clone())) {
            ranked.push(track);
        }
    }
    ranked
}
