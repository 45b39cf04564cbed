//! Settings persistence with change notification.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::settings::StoredSettings;

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Keys that changed in one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub changed_keys: Vec<String>,
}

/// Source of truth for user settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<StoredSettings, ConfigError>;

    /// Persist `settings`; subscribers are notified when anything changed.
    async fn save(&self, settings: StoredSettings) -> Result<(), ConfigError>;

    fn subscribe(&self) -> broadcast::Receiver<SettingsChange>;
}

fn notify(tx: &broadcast::Sender<SettingsChange>, old: &StoredSettings, new: &StoredSettings) {
    let changed_keys = old.changed_keys(new);
    if changed_keys.is_empty() {
        return;
    }
    debug!(keys = ?changed_keys, "Settings changed");
    // No subscribers is fine.
    let _ = tx.send(SettingsChange { changed_keys });
}

/// In-memory settings, for tests and headless runs.
pub struct MemorySettingsStore {
    current: RwLock<StoredSettings>,
    changes: broadcast::Sender<SettingsChange>,
}

impl MemorySettingsStore {
    pub fn new(initial: StoredSettings) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(initial),
            changes,
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(StoredSettings::default())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<StoredSettings, ConfigError> {
        Ok(self.current.read().await.clone())
    }

    async fn save(&self, settings: StoredSettings) -> Result<(), ConfigError> {
        let mut current = self.current.write().await;
        notify(&self.changes, &current, &settings);
        *current = settings;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }
}

/// TOML file backed settings (`settings.toml`).
pub struct FileSettingsStore {
    path: PathBuf,
    last_seen: RwLock<StoredSettings>,
    changes: broadcast::Sender<SettingsChange>,
}

impl FileSettingsStore {
    /// Open the store, reading the file if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let initial = read_settings(&path).await?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        info!("Settings store: {}", path.display());
        Ok(Self {
            path,
            last_seen: RwLock::new(initial),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file after an external edit and notify on differences.
    pub async fn reload(&self) -> Result<(), ConfigError> {
        let fresh = read_settings(&self.path).await?;
        let mut last_seen = self.last_seen.write().await;
        notify(&self.changes, &last_seen, &fresh);
        *last_seen = fresh;
        Ok(())
    }
}

async fn read_settings(path: &Path) -> Result<StoredSettings, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Settings file missing, using empty settings: {}", path.display());
            Ok(StoredSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    /// Reads the file as it is now. `last_seen` only moves on `save` and
    /// `reload`, so an external edit is still reported by the next `reload`.
    async fn load(&self) -> Result<StoredSettings, ConfigError> {
        read_settings(&self.path).await
    }

    async fn save(&self, settings: StoredSettings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(&settings)?;
        tokio::fs::write(&self.path, content).await?;

        let mut last_seen = self.last_seen.write().await;
        notify(&self.changes, &last_seen, &settings);
        *last_seen = settings;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }
}
