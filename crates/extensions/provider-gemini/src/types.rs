//! Gemini API types.

use serde::{Deserialize, Serialize};

/// A text part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Content made of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Sampling configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// generateContent request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

/// generateContent response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// `GET /models` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListModelsResponse {
    pub models: Option<Vec<ModelInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-pro`.
    pub name: String,
}

impl ListModelsResponse {
    /// Model ids without the `models/` resource prefix.
    pub fn model_ids(self) -> Option<Vec<String>> {
        self.models.map(|models| {
            models
                .into_iter()
                .map(|m| match m.name.rsplit_once('/') {
                    Some((_, id)) => id.to_string(),
                    None => m.name,
                })
                .collect()
        })
    }
}
