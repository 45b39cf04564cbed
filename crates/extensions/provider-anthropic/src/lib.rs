//! Anthropic messages adapter for Inline.

mod api;
mod models;
mod parser;
mod provider;

pub use models::DEFAULT_MODELS;
pub use provider::AnthropicProvider;
