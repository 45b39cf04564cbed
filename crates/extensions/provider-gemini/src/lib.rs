//! # Inline Provider - Gemini
//!
//! Google Gemini adapter, serving both `google` and `google-free`.

mod client;
mod provider;
mod types;

pub use provider::{GeminiProvider, DEFAULT_MODELS};
pub use types::*;
