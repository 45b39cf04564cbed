//! Inline - keyboard-triggered LLM rewriting of focused text fields
//!
//! Main entry point for the Inline CLI and dispatcher server.

mod cli;
mod cmd_correct;
mod cmd_serve;
mod cmd_settings;
mod providers;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use inline_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Get the .inline directory path.
pub(crate) fn inline_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".inline"))
        .unwrap_or_else(|| PathBuf::from(".inline"))
}

/// Load `inline.toml`, falling back to defaults when the default file is absent.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ConfigLoader::load_or_default(&inline_dir().join("inline.toml"))?,
    };
    Ok(config)
}

/// Initialize tracing with console and file output.
///
/// Console output goes to stderr so `correct` can print its result on stdout.
/// Log files rotate daily in the configured log directory.
fn init_tracing(logging: &LoggingConfig, default_level: &str) -> anyhow::Result<()> {
    let log_dir = ConfigLoader::expand_path(&logging.dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("inline")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the background writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // One-shot commands stay quiet unless RUST_LOG asks otherwise.
    let default_level = match cli.command {
        Commands::Serve { .. } => config.logging.level.as_str(),
        _ => "warn",
    };
    init_tracing(&config.logging, default_level)?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        let errors: Vec<String> = validation
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        anyhow::bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    match cli.command {
        Commands::Serve { host, port } => cmd_serve::run_server(config, host, port).await,
        Commands::Correct { function, text } => {
            cmd_correct::handle_correct_command(&config, &function, text).await
        }
        Commands::Settings { action } => {
            cmd_settings::handle_settings_command(&config, action).await
        }
    }
}
