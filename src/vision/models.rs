use serde::{Deserialize, Deserializer, Serialize};

/// Structured outfit analysis returned by the vision model.
///
/// Every field falls back to its empty value when the model omits it or sends
/// `null`, so consumers never branch on field presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub people_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_objects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_character: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outfit_characteristics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub background_aesthetics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub music_genre: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Field names and descriptions, in the order the model is asked to emit them.
pub(crate) const EXTRACTION_FIELDS: [(&str, &str, &str); 7] = [
    ("image_description", "string", "A short description of the image"),
    ("people_count", "integer", "Number of humans in the picture"),
    ("main_objects", "array of strings", "List of the main objects in the picture"),
    ("main_character", "string", "The main character in the picture"),
    (
        "outfit_characteristics",
        "array of strings",
        "Characteristics of the outfit worn by the main character",
    ),
    (
        "background_aesthetics",
        "array of strings",
        "Characteristics of the background behind the main character",
    ),
    (
        "music_genre",
        "array of strings",
        "Musical genres the photo belongs to",
    ),
];
