//! `inline correct`: run one correction through a headless page agent.
//!
//! The text goes into a textarea of an in-memory document and the function's
//! chord is pressed on it, so the request takes the same path as one from a
//! browser tab.

use std::io::Read;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::debug;

use inline_config::{Config, ConfigLoader, FileSettingsStore, SettingsStore};
use inline_dispatcher::{Dispatcher, ProviderSet, TabHub};
use inline_page::{
    EndpointLink, KeyDisposition, KeyEvent, MemoryDocument, PageElement, PageSession,
    SubmitOutcome,
};
use inline_protocols::chord::is_modifier;
use inline_protocols::{Chord, CorrectionFunction, DispatchEndpoint, DispatcherMessage, TabId};

use crate::providers::build_provider_set;

const CLI_TAB: &str = "cli";
const CLI_URL: &str = "inline://cli";

/// Handle `inline correct`.
pub(crate) async fn handle_correct_command(
    config: &Config,
    function: &str,
    text: Option<String>,
) -> anyhow::Result<()> {
    let function: CorrectionFunction = function.parse()?;
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    let settings_path = ConfigLoader::expand_path(&config.settings.path);
    let store = Arc::new(FileSettingsStore::open(&settings_path).await?);
    let providers = Arc::new(build_provider_set(&config.dispatcher)?);

    let corrected = correct_text(
        store,
        providers,
        config.dispatcher.request_timeout(),
        function,
        &text,
    )
    .await?;
    println!("{}", corrected);
    Ok(())
}

/// Correct `text` with `function` and return the field's content afterwards.
pub(crate) async fn correct_text(
    store: Arc<dyn SettingsStore>,
    providers: Arc<ProviderSet>,
    request_timeout: Duration,
    function: CorrectionFunction,
    text: &str,
) -> anyhow::Result<String> {
    let hub = Arc::new(TabHub::new());
    let dispatcher = Dispatcher::new(providers, hub.clone(), request_timeout);

    let tab = TabId::new(CLI_TAB);
    let mut inbox = hub.connect(tab.clone());
    let endpoint: Arc<dyn DispatchEndpoint> = Arc::new(dispatcher);
    let link = Rc::new(EndpointLink::new(&endpoint, tab));

    let document = Rc::new(MemoryDocument::new(CLI_URL));
    let session = PageSession::start(document.clone(), link, store).await?;

    let field = document.create_textarea();
    field.type_text(text);
    document.focus(&field);

    let chord = session
        .settings()
        .shortcuts
        .chord(function)
        .cloned()
        .unwrap_or_else(|| function.default_chord());
    let event = key_event_for(&chord)
        .with_context(|| format!("Shortcut {} has no literal key", chord))?;

    let request_id = match session.handle_key(&event).await {
        KeyDisposition::Submitted {
            outcome: SubmitOutcome::Pending(request_id),
            ..
        } => request_id,
        KeyDisposition::Submitted {
            outcome:
                SubmitOutcome::Rejected { error, .. } | SubmitOutcome::SendFailed { error, .. },
            ..
        } => bail!(error),
        KeyDisposition::NoOp { reason, .. } => {
            bail!("Nothing submitted: {} (see `inline settings show`)", reason)
        }
        KeyDisposition::Propagate => bail!("Shortcut {} is not bound to {}", chord, function),
    };
    debug!(request_id = %request_id, "Waiting for correction");

    while session.is_pending(&request_id) {
        let message = inbox
            .recv()
            .await
            .context("Dispatcher went away before answering")?;
        let failure = match &message {
            DispatcherMessage::TextCorrectionError {
                request_id: id,
                error,
            } if *id == request_id => Some(error.clone()),
            _ => None,
        };
        session.handle_message(message).await;
        if let Some(error) = failure {
            bail!(error);
        }
    }

    Ok(field.text())
}

/// The key event that presses `chord`. `None` without a literal key.
pub(crate) fn key_event_for(chord: &Chord) -> Option<KeyEvent> {
    let literal = chord.keys().iter().find(|k| !is_modifier(k))?;
    let mut event = KeyEvent::new(literal.clone());
    if chord.keys().contains("Meta") {
        event = event.meta();
    }
    if chord.keys().contains("Control") {
        event = event.ctrl();
    }
    if chord.keys().contains("Shift") {
        event = event.shift();
    }
    Some(event)
}

#[cfg(test)]
#[path = "cmd_correct_tests.rs"]
mod tests;
