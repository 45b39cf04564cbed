//! `inline serve`: the dispatcher behind a WebSocket channel.

use std::sync::Arc;

use tracing::{info, warn};

use inline_channel_ws::{WsChannel, WsChannelConfig};
use inline_config::{
    Config, ConfigLoader, FileSettingsStore, SettingsStore, SettingsValidator, SettingsWatcher,
};
use inline_dispatcher::Dispatcher;

use crate::providers::build_provider_set;

/// Run the dispatcher until Ctrl-C.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    info!("Starting Inline v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = ConfigLoader::expand_path(&config.settings.path);
    let store = Arc::new(FileSettingsStore::open(&settings_path).await?);
    info!("Settings: {}", settings_path.display());
    report_settings(store.as_ref()).await;

    let mut watcher = None;
    if config.settings.watch {
        let mut settings_watcher = SettingsWatcher::new(store.clone());
        match settings_watcher.start() {
            Ok(()) => watcher = Some(settings_watcher),
            Err(e) => warn!("Settings file will not be watched: {}", e),
        }
    }

    let providers = Arc::new(build_provider_set(&config.dispatcher)?);

    let channel = Arc::new(WsChannel::new(WsChannelConfig {
        host: host.unwrap_or_else(|| config.server.host.clone()),
        port: port.unwrap_or(config.server.port),
    }));

    let dispatcher = Dispatcher::from_config(&config.dispatcher, providers, channel.clone());
    let settings_task = dispatcher.watch_settings(store.clone());

    let addr = channel.start(Arc::new(dispatcher)).await?;
    info!("Page agents connect to ws://{}/ws", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    channel.stop();
    settings_task.abort();
    if let Some(mut watcher) = watcher {
        watcher.stop().await;
    }

    Ok(())
}

/// Log what page agents will be missing with the current settings.
async fn report_settings(store: &dyn SettingsStore) {
    let settings = match store.load().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings: {}", e);
            return;
        }
    };

    let result = SettingsValidator::validate(&settings);
    for error in &result.errors {
        warn!("settings.{}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        warn!("settings.{}: {}", warning.path, warning.message);
    }
    if result.is_valid() {
        let resolved = settings.resolve();
        info!(
            provider = resolved.provider.as_deref().unwrap_or("-"),
            model = resolved.model.as_deref().unwrap_or("-"),
            "Settings complete"
        );
    }
}
