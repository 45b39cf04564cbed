//! Hugging Face inference adapter for Inline.

mod api;
mod provider;

pub use provider::{HuggingFaceProvider, DEFAULT_MODELS};
