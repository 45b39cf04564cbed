//! Cohere generate API types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
pub struct Generation {
    pub text: String,
}

impl GenerateResponse {
    pub fn into_text(self) -> Option<String> {
        self.generations.into_iter().next().map(|g| g.text)
    }
}

/// `GET /models` response.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub models: Option<Vec<ModelEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

impl ModelList {
    pub fn names(self) -> Option<Vec<String>> {
        self.models
            .map(|models| models.into_iter().map(|m| m.name).collect())
    }
}
