//! Inference API types.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
pub struct InferenceParameters {
    pub temperature: f32,
    pub max_new_tokens: u32,
}

/// Pick the completion out of an inference response.
///
/// Text-generation models answer `[{"generated_text": ...}]`; some return a
/// bare string. Anything else is handed back as its JSON text.
pub fn extract_text(body: &Value) -> String {
    if let Some(text) = body
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        return text.to_string();
    }
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
