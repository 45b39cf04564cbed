//! Persisted user settings and their resolved, page-facing form.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use inline_protocols::{Chord, CorrectionFunction, SettingsStatus};

const API_KEY_PREFIX: &str = "apiKey_";

/// Settings exactly as persisted.
///
/// Secrets are stored as top-level `apiKey_<provider>` entries, one per
/// provider. `shortcut` is the legacy single chord for `fix_language`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<Vec<String>>,

    /// `apiKey_<provider>` entries. Other unknown keys are dropped on load.
    #[serde(flatten, deserialize_with = "api_key_entries")]
    pub api_keys: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<BTreeMap<String, Vec<String>>>,
}

impl StoredSettings {
    /// Secret stored for `provider`, if any.
    pub fn api_key_for(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(&format!("{}{}", API_KEY_PREFIX, provider))
            .map(String::as_str)
    }

    pub fn set_api_key(&mut self, provider: &str, key: impl Into<String>) {
        self.api_keys
            .insert(format!("{}{}", API_KEY_PREFIX, provider), key.into());
    }

    pub fn set_shortcut(&mut self, function: CorrectionFunction, chord: &Chord) {
        self.shortcuts
            .get_or_insert_with(BTreeMap::new)
            .insert(function.as_str().to_string(), chord.ordered_keys());
    }

    /// Keys whose values differ between `self` and `other`.
    pub fn changed_keys(&self, other: &StoredSettings) -> Vec<String> {
        let mut keys = Vec::new();
        if self.provider != other.provider {
            keys.push("provider".to_string());
        }
        if self.model != other.model {
            keys.push("model".to_string());
        }
        if self.shortcut != other.shortcut {
            keys.push("shortcut".to_string());
        }
        if self.shortcuts != other.shortcuts {
            keys.push("shortcuts".to_string());
        }
        let mut secret_keys: Vec<&String> =
            self.api_keys.keys().chain(other.api_keys.keys()).collect();
        secret_keys.sort();
        secret_keys.dedup();
        for key in secret_keys {
            if self.api_keys.get(key) != other.api_keys.get(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Resolve the values a page agent works with.
    pub fn resolve(&self) -> ResolvedSettings {
        let provider = non_empty(self.provider.as_deref());
        let api_key = provider
            .as_deref()
            .and_then(|p| non_empty(self.api_key_for(p)));

        ResolvedSettings {
            model: non_empty(self.model.as_deref()),
            api_key,
            provider,
            shortcuts: ShortcutTable::from_stored(self),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtraEntry {
    Text(String),
    Other(IgnoredAny),
}

fn api_key_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = BTreeMap::<String, ExtraEntry>::deserialize(deserializer)?;
    let mut keys = BTreeMap::new();
    for (name, entry) in entries {
        match entry {
            ExtraEntry::Text(value) if name.starts_with(API_KEY_PREFIX) => {
                keys.insert(name, value);
            }
            ExtraEntry::Other(_) if name.starts_with(API_KEY_PREFIX) => {
                warn!("Ignoring non-string settings entry {}", name);
            }
            _ => {}
        }
    }
    Ok(keys)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Page-facing settings cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub shortcuts: ShortcutTable,
}

impl ResolvedSettings {
    pub fn status(&self) -> SettingsStatus {
        SettingsStatus {
            has_provider: self.provider.is_some(),
            has_api_key: self.api_key.is_some(),
            has_model: self.model.is_some(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status().is_complete()
    }
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        StoredSettings::default().resolve()
    }
}

/// Chord per correction function, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutTable {
    entries: Vec<(CorrectionFunction, Chord)>,
}

impl ShortcutTable {
    /// Configured chords, falling back to defaults per function.
    ///
    /// Without a `shortcuts` table the legacy `shortcut` list, when present,
    /// becomes the `fix_language` chord. Invalid chords fall back too.
    pub fn from_stored(stored: &StoredSettings) -> Self {
        let entries = CorrectionFunction::ALL
            .into_iter()
            .map(|function| {
                let configured = match &stored.shortcuts {
                    Some(map) => map.get(function.as_str()),
                    None if function == CorrectionFunction::FixLanguage => stored
                        .shortcut
                        .as_ref()
                        .filter(|keys| !keys.is_empty()),
                    None => None,
                };

                let chord = match configured.map(Chord::new) {
                    Some(Ok(chord)) => chord,
                    Some(Err(e)) => {
                        warn!(function = %function, error = %e, "Ignoring invalid shortcut, using default");
                        function.default_chord()
                    }
                    None => function.default_chord(),
                };
                (function, chord)
            })
            .collect();

        Self { entries }
    }

    pub fn chord(&self, function: CorrectionFunction) -> Option<&Chord> {
        self.entries
            .iter()
            .find(|(f, _)| *f == function)
            .map(|(_, chord)| chord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CorrectionFunction, Chord)> {
        self.entries.iter()
    }
}

impl Default for ShortcutTable {
    fn default() -> Self {
        Self::from_stored(&StoredSettings::default())
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
