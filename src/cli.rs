//! CLI definitions for Inline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inline CLI.
#[derive(Parser)]
#[command(name = "inline")]
#[command(about = "Keyboard-triggered LLM rewriting of focused text fields")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.inline/inline.toml)
    #[arg(short, long, global = true, env = "INLINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the dispatcher and accept page agents over WebSocket
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Correct text through a headless page agent and print the result
    Correct {
        /// Correction function (fix_language, rephrase_as_friendly_and_professional)
        #[arg(short, long, default_value = "fix_language")]
        function: String,

        /// Text to correct (read from stdin when omitted)
        text: Option<String>,
    },

    /// Inspect or change the persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum SettingsAction {
    /// Print the settings, secrets masked
    Show,

    /// Select the active provider
    SetProvider {
        /// Provider id (openai, anthropic, google, ...)
        provider: String,

        /// Model to use; defaults to the provider's cheapest suggested model
        #[arg(long)]
        model: Option<String>,
    },

    /// List the models a provider offers
    Models {
        /// Provider id (default: the active provider)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Select the model for the active provider
    SetModel {
        model: String,
    },

    /// Store an API key
    SetKey {
        /// The key itself
        #[arg(required_unless_present = "from_env")]
        key: Option<String>,

        /// Provider the key belongs to (default: the active provider)
        #[arg(long)]
        provider: Option<String>,

        /// Read the key from this environment variable
        #[arg(long, conflicts_with = "key")]
        from_env: Option<String>,
    },

    /// Bind a chord to a correction function
    SetShortcut {
        /// Correction function
        function: String,

        /// Keys of the chord, e.g. Meta Control Shift T
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },
}
