//! File watcher for external edits to `settings.toml`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::ConfigError;
use crate::store::FileSettingsStore;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Reloads a [`FileSettingsStore`] when its file changes on disk, so that
/// subscribers see hand edits the same way as saves.
pub struct SettingsWatcher {
    store: Arc<FileSettingsStore>,
    _watcher: Option<RecommendedWatcher>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SettingsWatcher {
    pub fn new(store: Arc<FileSettingsStore>) -> Self {
        Self {
            store,
            _watcher: None,
            shutdown_tx: None,
        }
    }

    /// Start watching. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let file = self.store.path().to_path_buf();
        // Editors often replace the file, so watch the directory.
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(100);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if let Ok(event) = result {
                    let _ = event_tx.blocking_send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| ConfigError::Watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Watch(format!("Failed to watch {}: {}", dir.display(), e)))?;
        info!("Watching for settings changes: {}", file.display());

        self._watcher = Some(watcher);
        self.shutdown_tx = Some(shutdown_tx);

        let store = self.store.clone();
        tokio::spawn(async move {
            let mut debounce_timer: Option<tokio::time::Instant> = None;

            loop {
                tokio::select! {
                    Some(event) = event_rx.recv() => {
                        if Self::is_relevant_event(&event, &file) {
                            debug!("Settings file change detected: {:?}", event.paths);
                            debounce_timer = Some(tokio::time::Instant::now());
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Settings watcher shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(100)) => {
                        if let Some(timer) = debounce_timer {
                            if timer.elapsed() >= DEBOUNCE {
                                debounce_timer = None;
                                if let Err(e) = store.reload().await {
                                    error!("Failed to reload settings: {}", e);
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        self._watcher = None;
    }

    fn is_relevant_event(event: &Event, file: &Path) -> bool {
        let kind = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        );
        kind && event
            .paths
            .iter()
            .any(|p| p.file_name() == file.file_name())
    }
}

impl Drop for SettingsWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
