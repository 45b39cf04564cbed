//! Keyboard chords.
//!
//! A chord is an unordered set of modifier keys plus exactly one literal key.
//! Two chords are equal when their key sets are equal; press order and
//! configured order never matter.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProtocolError;

/// Modifier vocabulary, in display order.
pub const MODIFIER_KEYS: [&str; 3] = ["Meta", "Control", "Shift"];

/// Returns true if `key` names one of the recognized modifiers.
pub fn is_modifier(key: &str) -> bool {
    MODIFIER_KEYS.contains(&key)
}

/// Normalize a key name: single characters are upper-cased, named keys are
/// left as-is.
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_uppercase().collect(),
        _ => key.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    keys: BTreeSet<String>,
}

impl Chord {
    /// Build a chord from configured key names.
    ///
    /// Keys are normalized; duplicates, an empty list, and anything other
    /// than exactly one non-modifier key are rejected.
    pub fn new<I, S>(keys: I) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let invalid = |reason: String| ProtocolError::InvalidChord {
            chord: raw.join("+"),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("no keys".to_string()));
        }

        let mut set = BTreeSet::new();
        for key in &raw {
            if key.is_empty() {
                return Err(invalid("empty key name".to_string()));
            }
            let normalized = normalize_key(key);
            if !set.insert(normalized.clone()) {
                return Err(invalid(format!("duplicate key {}", normalized)));
            }
        }

        let literals = set.iter().filter(|k| !is_modifier(k)).count();
        if literals != 1 {
            return Err(invalid(format!(
                "expected exactly one non-modifier key, found {}",
                literals
            )));
        }

        Ok(Self { keys: set })
    }

    /// Build a chord from keys known to be valid.
    pub(crate) fn from_trusted<const N: usize>(keys: [&str; N]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Set equality with the keys of a key event.
    pub fn matches(&self, pressed: &BTreeSet<String>) -> bool {
        self.keys == *pressed
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in display order: modifiers first, then the literal key.
    pub fn ordered_keys(&self) -> Vec<String> {
        let mut ordered: Vec<String> = MODIFIER_KEYS
            .iter()
            .filter(|m| self.keys.contains(**m))
            .map(|m| m.to_string())
            .collect();
        ordered.extend(self.keys.iter().filter(|k| !is_modifier(k)).cloned());
        ordered
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ordered_keys().join("+"))
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ordered_keys().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<String>::deserialize(deserializer)?;
        Chord::new(keys).map_err(serde::de::Error::custom)
    }
}
