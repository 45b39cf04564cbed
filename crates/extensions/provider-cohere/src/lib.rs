//! Cohere generate adapter for Inline, serving `cohere` and `cohere-free`.

mod api;
mod provider;

pub use provider::{CohereProvider, DEFAULT_MODELS};
