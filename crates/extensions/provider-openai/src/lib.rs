//! OpenAI-compatible chat completion adapters for Inline.
//!
//! One wire format serves OpenAI, Mistral, Perplexity, Groq and Together;
//! each id gets its own [`OpenAIProvider`] with that vendor's endpoint.

mod api;
mod models;
mod provider;

pub use models::default_models;
pub use provider::{OpenAIProvider, FAMILY};
