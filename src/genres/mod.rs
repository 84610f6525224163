//! Mapping of free-text genre predictions onto the catalog's genre tags.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Genre tags the catalog search understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizedGenre {
    HipHop,
    Trap,
    RNB,
    Pop,
    Soul,
    Edm,
    Rock,
    Indie,
    Synthwave,
    Electronic,
}

impl NormalizedGenre {
    pub const ALL: [NormalizedGenre; 10] = [
        NormalizedGenre::HipHop,
        NormalizedGenre::Trap,
        NormalizedGenre::RNB,
        NormalizedGenre::Pop,
        NormalizedGenre::Soul,
        NormalizedGenre::Edm,
        NormalizedGenre::Rock,
        NormalizedGenre::Indie,
        NormalizedGenre::Synthwave,
        NormalizedGenre::Electronic,
    ];

    /// Tag used in catalog `genre:"..."` filters.
    pub fn as_tag(&self) -> &'static str {
        match self {
            NormalizedGenre::HipHop => "hip-hop",
            NormalizedGenre::Trap => "trap",
            NormalizedGenre::RNB => "r-n-b",
            NormalizedGenre::Pop => "pop",
            NormalizedGenre::Soul => "soul",
            NormalizedGenre::Edm => "edm",
            NormalizedGenre::Rock => "rock",
            NormalizedGenre::Indie => "indie",
            NormalizedGenre::Synthwave => "synthwave",
            NormalizedGenre::Electronic => "electronic",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_tag() == tag)
    }
}

impl fmt::Display for NormalizedGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Outcome of normalizing a genre list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreSelection {
    /// Never empty.
    pub genres: Vec<NormalizedGenre>,
    /// True when nothing matched and the default genre was substituted.
    pub used_fallback: bool,
}

/// Label→tag lookup table plus the genre used when nothing matches.
///
/// Labels are stored case-folded; lookups case-fold the input the same way.
#[derive(Debug, Clone)]
pub struct GenreVocabulary {
    mapping: HashMap<String, NormalizedGenre>,
    default_genre: NormalizedGenre,
}

impl GenreVocabulary {
    pub fn new(
        mapping: impl IntoIterator<Item = (String, NormalizedGenre)>,
        default_genre: NormalizedGenre,
    ) -> Self {
        let mapping = mapping
            .into_iter()
            .map(|(label, genre)| (fold(&label), genre))
            .collect();
        Self {
            mapping,
            default_genre,
        }
    }

    pub fn default_genre(&self) -> NormalizedGenre {
        self.default_genre
    }

    pub fn lookup(&self, label: &str) -> Option<NormalizedGenre> {
        self.mapping.get(&fold(label)).copied()
    }

    /// Map predicted labels onto the vocabulary.
    ///
    /// Unrecognized labels are dropped. Order of first appearance is kept and
    /// repeated tags are collapsed. An empty outcome is replaced by the
    /// default genre, so the result is never empty.
    pub fn normalize<S: AsRef<str>>(&self, labels: &[S]) -> GenreSelection {
        let mut seen = HashSet::new();
        let mut genres = Vec::new();

        for label in labels {
            let label = label.as_ref();
            match self.lookup(label) {
                Some(genre) => {
                    if seen.insert(genre) {
                        genres.push(genre);
                    }
                }
                None => debug!(label, "Dropping unrecognized genre label"),
            }
        }

        if genres.is_empty() {
            warn!(
                default = %self.default_genre,
                "No matching genres found, using default genre"
            );
            return GenreSelection {
                genres: vec![self.default_genre],
                used_fallback: true,
            };
        }

        GenreSelection {
            genres,
            used_fallback: false,
        }
    }
}

impl Default for GenreVocabulary {
    fn default() -> Self {
        Self::new(default_mapping(), NormalizedGenre::HipHop)
    }
}

/// The built-in label table.
pub fn default_mapping() -> Vec<(String, NormalizedGenre)> {
    [
        ("hip-hop", NormalizedGenre::HipHop),
        ("trap", NormalizedGenre::Trap),
        ("r&b", NormalizedGenre::RNB),
        ("pop", NormalizedGenre::Pop),
        ("soul", NormalizedGenre::Soul),
        ("edm", NormalizedGenre::Edm),
        ("rock", NormalizedGenre::Rock),
        ("indie rock", NormalizedGenre::Indie),
        ("synthwave", NormalizedGenre::Synthwave),
        ("electronic", NormalizedGenre::Electronic),
    ]
    .into_iter()
    .map(|(label, genre)| (label.to_string(), genre))
    .collect()
}

/// Lowercases and also trims surrounding whitespace.
fn fold(label: &str) -> String {
    label.trim().to_lowercase()
}
