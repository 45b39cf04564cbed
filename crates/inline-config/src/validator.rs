//! Configuration and settings validation.

use std::str::FromStr;

use inline_protocols::{Chord, CorrectionFunction, ProviderId};

use crate::schema::Config;
use crate::settings::StoredSettings;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Dispatcher configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_server(config, &mut result);
        Self::validate_dispatcher(config, &mut result);
        Self::validate_logging(config, &mut result);
        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }
        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_dispatcher(config: &Config, result: &mut ValidationResult) {
        let dispatcher = &config.dispatcher;

        if dispatcher.request_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "dispatcher.request_timeout_seconds",
                "request_timeout_seconds must be greater than 0",
            ));
        } else if dispatcher.request_timeout_seconds > 600 {
            result.add_warning(ValidationWarning::new(
                "dispatcher.request_timeout_seconds",
                "request timeout is very high (>600s), spinners may stay visible for a long time",
            ));
        }

        if dispatcher.connect_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "dispatcher.connect_timeout_seconds",
                "connect_timeout_seconds must be greater than 0",
            ));
        }

        if !(0.0..=2.0).contains(&dispatcher.temperature) {
            result.add_error(ValidationError::new(
                "dispatcher.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if dispatcher.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "dispatcher.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unrecognized level '{}', RUST_LOG or 'info' will be used",
                    config.logging.level
                ),
            ));
        }
    }
}

/// User settings validator.
///
/// Incomplete settings are reported as errors even though a page agent
/// still starts with them; it just cannot submit corrections.
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &StoredSettings) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_provider(settings, &mut result);
        Self::validate_shortcuts(settings, &mut result);
        result
    }

    fn validate_provider(settings: &StoredSettings, result: &mut ValidationResult) {
        let resolved = settings.resolve();

        match resolved.provider.as_deref() {
            None => result.add_error(ValidationError::new("provider", "No provider selected")),
            Some(provider) => {
                if ProviderId::from_str(provider).is_err() {
                    result.add_error(ValidationError::new(
                        "provider",
                        format!("Unknown provider: {}", provider),
                    ));
                }
                if resolved.api_key.is_none() {
                    result.add_error(ValidationError::new(
                        format!("apiKey_{}", provider),
                        format!("No API key stored for {}", provider),
                    ));
                }
            }
        }

        if resolved.model.is_none() {
            result.add_error(ValidationError::new("model", "No model selected"));
        }

        for key in settings.api_keys.keys() {
            let provider = key.strip_prefix("apiKey_");
            let known = provider.is_some_and(|p| ProviderId::from_str(p).is_ok());
            if !known {
                result.add_warning(ValidationWarning::new(
                    key.clone(),
                    "Entry does not belong to a known provider and is ignored",
                ));
            }
        }
    }

    fn validate_shortcuts(settings: &StoredSettings, result: &mut ValidationResult) {
        let Some(table) = &settings.shortcuts else {
            if let Some(keys) = &settings.shortcut {
                if let Err(e) = Chord::new(keys) {
                    result.add_error(ValidationError::new("shortcut", e.to_string()));
                }
            }
            return;
        };

        for (name, keys) in table {
            let path = format!("shortcuts.{}", name);
            if CorrectionFunction::from_str(name).is_err() {
                result.add_warning(ValidationWarning::new(
                    path.clone(),
                    format!("Unknown function '{}' is ignored", name),
                ));
            }
            if let Err(e) = Chord::new(keys) {
                result.add_error(ValidationError::new(path, e.to_string()));
            }
        }

        let shortcuts = settings.resolve().shortcuts;
        let entries: Vec<_> = shortcuts.iter().collect();
        for (i, (first, chord)) in entries.iter().enumerate() {
            for (second, other) in &entries[i + 1..] {
                if chord == other {
                    result.add_warning(ValidationWarning::new(
                        format!("shortcuts.{}", second),
                        format!(
                            "Chord {} is also bound to {}, which takes precedence",
                            chord, first
                        ),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
