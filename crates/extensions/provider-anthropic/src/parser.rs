//! Response parsing utilities.

use inline_protocols::ProviderError;

use crate::api::{ApiResponse, ContentBlock};

/// Extract the trimmed text of the first content block.
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    match response.content.into_iter().next() {
        Some(ContentBlock::Text { text }) => Ok(text.trim().to_string()),
        _ => Err(ProviderError::MalformedResponse(
            "missing content[0].text".to_string(),
        )),
    }
}
