//! Anthropic model suggestions.

/// Suggested models, cheapest last.
pub const DEFAULT_MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];
