//! # Inline Config
//!
//! Dispatcher configuration (`inline.toml`) and the persisted user settings
//! store (`settings.toml`) with change notification.

mod error;
mod loader;
mod schema;
mod settings;
mod store;
mod validator;
mod watcher;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use settings::{ResolvedSettings, ShortcutTable, StoredSettings};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsChange, SettingsStore};
pub use validator::{
    ConfigValidator, SettingsValidator, ValidationError, ValidationResult, ValidationWarning,
};
pub use watcher::SettingsWatcher;
