//! Suggested models per provider.

use inline_protocols::ProviderId;

/// Suggested models for `provider`, cheapest last.
pub fn default_models(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::OpenAI => &["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo"],
        ProviderId::Mistral => &[
            "mistral-large-latest",
            "mistral-medium-latest",
            "mistral-small-latest",
        ],
        ProviderId::Perplexity => &[
            "llama-3.1-sonar-large-128k-online",
            "llama-3.1-sonar-small-128k-online",
        ],
        ProviderId::Groq => &["llama-3-70b-8192", "mixtral-8x7b-32768", "gemma-7b-it"],
        ProviderId::Together => &[
            "mistralai/Mixtral-8x7B-Instruct-v0.1",
            "meta-llama/Llama-2-70b-chat-hf",
        ],
        _ => &[],
    }
}
