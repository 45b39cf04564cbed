//! Provider adapter errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP status. The message is what the vendor reported, or
    /// `API error: <status>` when the body carried nothing usable.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Build an API error from a non-success status and the raw response body.
    ///
    /// Recognizes `{"error": {"message": "..."}}` and `{"error": "..."}`.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v["error"]["message"]
                    .as_str()
                    .or_else(|| v["error"].as_str())
                    .map(String::from)
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("API error: {}", status));
        ProviderError::Api { status, message }
    }

    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
