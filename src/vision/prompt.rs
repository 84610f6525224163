//! Instruction text sent alongside the outfit photo.

use super::models::EXTRACTION_FIELDS;
use serde_json::{json, Map, Value};

/// Behavioral instructions: persona, rules, a worked example and the
/// prohibition on naming concrete songs or artists.
pub const VISION_PROMPT: &str = r#"You are a vision assistant that studies photos of outfits and predicts which styles of music match the look. Your output feeds an automated music search, so it must be structured and factual.

Rules:
- Look carefully at the outfit and the surroundings before answering.
- Describe fashion features: garment types, colors, textures and overall aesthetic.
- Predict music genres that fit the vibe of the outfit (for example hip-hop, indie rock, synthwave, r&b).
- Only describe what is visible. If a detail is unclear, leave it out rather than guess.
- Never recommend specific songs, playlists or artists.
- Do not mention current trends, politics or celebrities unless they are clearly depicted.
- If the image is too unclear to judge, say so in image_description and return an empty music_genre list.

Work through it in order: identify the main character, describe the outfit, note the background, then infer genres from what you described.

Example
Photo: a person in neon streetwear in front of a graffiti wall at night.
Answer:
{"image_description": "Energetic streetwear outfit with a vibrant urban feel.", "people_count": 1, "main_objects": ["hoodie", "jeans", "sneakers", "graffiti wall"], "main_character": "Person wearing a neon green hoodie, ripped jeans and sneakers.", "outfit_characteristics": ["Neon green hoodie", "Distressed denim jeans", "Chunky white sneakers"], "background_aesthetics": ["Graffiti wall", "Urban street", "Night lighting"], "music_genre": ["Hip-Hop", "EDM", "Trap"]}

Reply with the JSON object only."#;

/// Machine-readable description of the expected answer.
pub fn format_instructions() -> String {
    let mut properties = Map::new();
    for (name, kind, description) in EXTRACTION_FIELDS {
        let schema = match kind {
            "integer" => json!({"type": "integer", "minimum": 0, "description": description}),
            "array of strings" => {
                json!({"type": "array", "items": {"type": "string"}, "description": description})
            }
            _ => json!({"type": "string", "description": description}),
        };
        properties.insert(name.to_string(), schema);
    }

    let required: Vec<Value> = EXTRACTION_FIELDS
        .iter()
        .map(|(name, _, _)| Value::from(*name))
        .collect();

    let schema = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });

    format!(
        "The output must be a single JSON object that conforms to the JSON schema below. \
         Do not wrap it in markdown fences and do not add any text before or after it.\n\n\
         Schema:\n{}",
        schema
    )
}
