//! Settings subcommand handlers for Inline.
//!
//! Every write goes through the settings store, so a running `inline serve`
//! watching the same file broadcasts `settingsUpdated` to its tabs.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, bail};

use inline_config::{
    Config, ConfigLoader, FileSettingsStore, SettingsStore, SettingsValidator, ShortcutTable,
    StoredSettings,
};
use inline_dispatcher::ProviderSet;
use inline_protocols::{Chord, CorrectionFunction, ProviderId};

use crate::cli::SettingsAction;
use crate::providers::{ModelSource, available_models, build_provider_set, suggested_models};

/// Handle settings subcommands.
pub(crate) async fn handle_settings_command(
    config: &Config,
    action: SettingsAction,
) -> anyhow::Result<()> {
    let path = ConfigLoader::expand_path(&config.settings.path);
    let store = FileSettingsStore::open(&path).await?;
    let mut settings = store.load().await?;

    let message = match action {
        SettingsAction::Show => {
            println!("# {}", path.display());
            print!("{}", render(&settings));
            return Ok(());
        }
        SettingsAction::SetProvider { provider, model } => {
            set_provider(&mut settings, &provider, model)?
        }
        SettingsAction::Models { provider } => {
            let providers = build_provider_set(&config.dispatcher)?;
            print!("{}", list_models(&settings, &providers, provider.as_deref()).await?);
            return Ok(());
        }
        SettingsAction::SetModel { model } => {
            let providers = build_provider_set(&config.dispatcher)?;
            set_model(&mut settings, &providers, &model).await?
        }
        SettingsAction::SetKey {
            key,
            provider,
            from_env,
        } => {
            let key = match (key, from_env) {
                (_, Some(var)) => std::env::var(&var)
                    .with_context(|| format!("Environment variable not set: {}", var))?,
                (Some(key), None) => key,
                (None, None) => bail!("Pass a key or --from-env VAR"),
            };
            set_key(&mut settings, provider.as_deref(), &key)?
        }
        SettingsAction::SetShortcut { function, keys } => {
            set_shortcut(&mut settings, &function, &keys)?
        }
    };

    store.save(settings).await?;
    println!("{}", message);
    Ok(())
}

/// Select `provider`. Without an explicit model, a model that does not
/// belong to the provider is replaced by its cheapest suggestion.
pub(crate) fn set_provider(
    settings: &mut StoredSettings,
    provider: &str,
    model: Option<String>,
) -> anyhow::Result<String> {
    let id = ProviderId::from_str(provider)?;
    let suggested = suggested_models(id);

    let model = match model {
        Some(model) => model,
        None => match settings.model.take() {
            Some(current) if suggested.contains(&current.as_str()) => current,
            _ => suggested
                .last()
                .map(|m| m.to_string())
                .with_context(|| format!("No suggested model for {}, pass --model", id))?,
        },
    };

    let mut message = format!("Provider set to {} with model {}", id.display_name(), model);
    if settings.api_key_for(id.as_str()).is_none_or(str::is_empty) {
        let _ = write!(
            message,
            "\nNo API key stored for {}; run `inline settings set-key --provider {} <KEY>`",
            id, id
        );
    }

    settings.provider = Some(id.as_str().to_string());
    settings.model = Some(model);
    Ok(message)
}

/// Models offered for `provider` or the selected one, the selected model
/// marked with `*`.
pub(crate) async fn list_models(
    settings: &StoredSettings,
    providers: &ProviderSet,
    provider: Option<&str>,
) -> anyhow::Result<String> {
    let id = match provider.or(settings.provider.as_deref()) {
        Some(provider) => ProviderId::from_str(provider)?,
        None => bail!("No provider selected; pass --provider"),
    };
    let (models, source) = available_models(providers, id, settings.api_key_for(id.as_str())).await;

    let selected = settings
        .model
        .as_deref()
        .filter(|_| settings.provider.as_deref() == Some(id.as_str()));
    let origin = match source {
        ModelSource::Listed => "listed by the provider",
        ModelSource::Suggested => "suggested",
    };

    let mut out = String::new();
    let _ = writeln!(out, "# {} models ({})", id.display_name(), origin);
    for model in &models {
        let marker = if Some(model.as_str()) == selected { "*" } else { " " };
        let _ = writeln!(out, "{} {}", marker, model);
    }
    Ok(out)
}

/// Select `model`, flagging it when the provider does not offer it.
pub(crate) async fn set_model(
    settings: &mut StoredSettings,
    providers: &ProviderSet,
    model: &str,
) -> anyhow::Result<String> {
    let model = model.trim();
    if model.is_empty() {
        bail!("Model cannot be empty");
    }
    settings.model = Some(model.to_string());

    let mut message = format!("Model set to {}", model);
    let provider = settings.provider.as_deref().map(ProviderId::from_str);
    if let Some(Ok(id)) = provider {
        let (offered, source) =
            available_models(providers, id, settings.api_key_for(id.as_str())).await;
        if !offered.iter().any(|m| m == model) {
            let _ = match source {
                ModelSource::Listed => {
                    write!(message, " (not listed by {} for this key)", id.display_name())
                }
                ModelSource::Suggested => {
                    write!(message, " (not a suggested {} model)", id.display_name())
                }
            };
        }
    }
    Ok(message)
}

/// Store `key` for `provider`, or for the selected provider.
pub(crate) fn set_key(
    settings: &mut StoredSettings,
    provider: Option<&str>,
    key: &str,
) -> anyhow::Result<String> {
    let provider = match provider.or(settings.provider.as_deref()) {
        Some(provider) => ProviderId::from_str(provider)?,
        None => bail!("No provider selected; pass --provider"),
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("API key cannot be empty");
    }

    settings.set_api_key(provider.as_str(), key);
    Ok(format!("Stored API key for {} ({})", provider, mask_secret(key)))
}

/// Bind `keys` to `function`. A legacy single `shortcut` is migrated first
/// so it keeps applying to `fix_language`.
pub(crate) fn set_shortcut(
    settings: &mut StoredSettings,
    function: &str,
    keys: &[String],
) -> anyhow::Result<String> {
    let function = CorrectionFunction::from_str(function)?;
    let chord = Chord::new(keys)?;

    if settings.shortcuts.is_none() {
        if let Some(legacy) = settings.shortcut.take() {
            if let Ok(legacy) = Chord::new(&legacy) {
                settings.set_shortcut(CorrectionFunction::FixLanguage, &legacy);
            }
        }
    }
    settings.set_shortcut(function, &chord);

    let mut message = format!("{} bound to {}", function, chord);
    for warning in SettingsValidator::validate(settings).warnings {
        if warning.path.starts_with("shortcuts.") {
            let _ = write!(message, "\nwarning: {}", warning.message);
        }
    }
    Ok(message)
}

/// Human-readable settings, secrets masked.
pub(crate) fn render(settings: &StoredSettings) -> String {
    let resolved = settings.resolve();
    let mut out = String::new();

    let _ = writeln!(out, "provider = {}", resolved.provider.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "model    = {}", resolved.model.as_deref().unwrap_or("-"));

    let _ = writeln!(out, "\n[api keys]");
    if settings.api_keys.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for (name, value) in &settings.api_keys {
        let _ = writeln!(out, "{} = {}", name, mask_secret(value));
    }

    let _ = writeln!(out, "\n[shortcuts]");
    for (function, chord) in ShortcutTable::from_stored(settings).iter() {
        let _ = writeln!(out, "{} = {}", function, chord);
    }

    let result = SettingsValidator::validate(settings);
    if !result.errors.is_empty() || !result.warnings.is_empty() {
        let _ = writeln!(out);
    }
    for error in &result.errors {
        let _ = writeln!(out, "error: {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        let _ = writeln!(out, "warning: {}: {}", warning.path, warning.message);
    }
    out
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
#[path = "cmd_settings_tests.rs"]
mod tests;
