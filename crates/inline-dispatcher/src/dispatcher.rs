//! Request routing and push-back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use inline_config::{DispatcherConfig, SettingsStore};
use inline_protocols::message::preview;
use inline_protocols::{
    CorrectTextRequest, CorrectionFunction, DispatchAck, DispatchEndpoint, DispatcherMessage,
    PageMessage, ProviderAdapter, ProviderError, ProviderRequest, RequestId, TabId, TabOutbox,
};

use crate::registry::ProviderSet;

/// Reason announced to tabs when the dispatcher comes up.
pub const STARTUP_REASON: &str = "service_worker_started";

/// Outcome of pushing one message to every known tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Stateless router from correction requests to provider adapters.
///
/// Every accepted request runs on its own task; the caller only ever waits
/// for the synchronous [`DispatchAck`]. Routing spawns onto the ambient
/// Tokio runtime, so [`Dispatcher::handle_page_message`] must be called from
/// within one.
#[derive(Clone)]
pub struct Dispatcher {
    providers: Arc<ProviderSet>,
    outbox: Arc<dyn TabOutbox>,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        providers: Arc<ProviderSet>,
        outbox: Arc<dyn TabOutbox>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            outbox,
            request_timeout,
        }
    }

    pub fn from_config(
        config: &DispatcherConfig,
        providers: Arc<ProviderSet>,
        outbox: Arc<dyn TabOutbox>,
    ) -> Self {
        Self::new(providers, outbox, config.request_timeout())
    }

    pub fn providers(&self) -> &Arc<ProviderSet> {
        &self.providers
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Entry point for every page message.
    ///
    /// Returns an ack for `correctText` only; diagnostics are logged.
    pub fn handle_page_message(&self, tab: &TabId, message: PageMessage) -> Option<DispatchAck> {
        match message {
            PageMessage::CorrectText(request) => Some(self.route(tab, request)),
            PageMessage::ShortcutActivated {
                url,
                active_element,
            } => {
                info!(
                    tab = %tab,
                    url = %url,
                    element = ?active_element,
                    "Shortcut activated"
                );
                None
            }
            PageMessage::ShortcutNoInput {
                url,
                reason,
                active_element,
                settings_status,
            } => {
                warn!(
                    tab = %tab,
                    url = %url,
                    reason = %reason,
                    element = ?active_element,
                    settings = ?settings_status,
                    "Shortcut had nothing to correct"
                );
                None
            }
        }
    }

    /// Resolve the adapter and spawn the provider call.
    fn route(&self, tab: &TabId, request: CorrectTextRequest) -> DispatchAck {
        let request_id = request.request_id.clone();

        let adapter = match self.providers.resolve(&request.provider) {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(
                    tab = %tab,
                    request_id = %request_id,
                    provider = %request.provider,
                    "Rejecting correction request: {}", e
                );
                return DispatchAck::Rejected {
                    request_id,
                    error: e.to_string(),
                };
            }
        };

        let function = CorrectionFunction::resolve(request.function_type.as_deref());
        info!(
            tab = %tab,
            request_id = %request_id,
            provider = %request.provider,
            model = %request.model,
            function = %function,
            text = %preview(&request.text, 100),
            "Routing correction request"
        );

        let provider_request =
            ProviderRequest::new(request.api_key, request.model, request.text, function.prompt());

        tokio::spawn(run_request(
            adapter,
            provider_request,
            request_id.clone(),
            tab.clone(),
            self.outbox.clone(),
            self.request_timeout,
        ));

        DispatchAck::Accepted { request_id }
    }

    /// Push `settingsUpdated` to every known tab.
    pub async fn broadcast_settings_updated(&self) -> BroadcastSummary {
        self.broadcast(DispatcherMessage::SettingsUpdated).await
    }

    /// Push `extensionInstalled` to every known tab.
    pub async fn announce_installed(&self, reason: &str) -> BroadcastSummary {
        self.broadcast(DispatcherMessage::ExtensionInstalled {
            reason: reason.to_string(),
        })
        .await
    }

    async fn broadcast(&self, message: DispatcherMessage) -> BroadcastSummary {
        let tabs = self.outbox.tabs();
        let mut summary = BroadcastSummary {
            total: tabs.len(),
            ..Default::default()
        };

        for tab in &tabs {
            match self.outbox.push(tab, message.clone()).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    debug!(tab = %tab, kind = message.kind(), "Broadcast skipped tab: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            kind = message.kind(),
            total = summary.total,
            delivered = summary.delivered,
            failed = summary.failed,
            "Broadcast finished"
        );
        summary
    }

    /// Forward every settings change as a `settingsUpdated` broadcast.
    ///
    /// The subscription is taken before this returns, so changes saved right
    /// after the call are not missed.
    pub fn watch_settings(&self, store: Arc<dyn SettingsStore>) -> JoinHandle<()> {
        let mut changes = store.subscribe();
        let dispatcher = self.clone();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        debug!(keys = ?change.changed_keys, "Settings changed");
                        dispatcher.broadcast_settings_updated().await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Settings watcher lagged");
                        dispatcher.broadcast_settings_updated().await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Settings store closed, stopping watcher");
                        break;
                    }
                }
            }
        })
    }
}

impl DispatchEndpoint for Dispatcher {
    fn handle(&self, tab: &TabId, message: PageMessage) -> Option<DispatchAck> {
        self.handle_page_message(tab, message)
    }

    fn tab_connected(&self, tab: &TabId) {
        let outbox = self.outbox.clone();
        let tab = tab.clone();
        tokio::spawn(async move {
            let message = DispatcherMessage::ExtensionInstalled {
                reason: STARTUP_REASON.to_string(),
            };
            if let Err(e) = outbox.push(&tab, message).await {
                debug!(tab = %tab, "Startup announcement not delivered: {}", e);
            }
        });
    }
}

/// Invoke one adapter under the timeout and push the outcome to the origin tab.
async fn run_request(
    adapter: Arc<dyn ProviderAdapter>,
    request: ProviderRequest,
    request_id: RequestId,
    tab: TabId,
    outbox: Arc<dyn TabOutbox>,
    timeout: Duration,
) {
    let started = Instant::now();
    let result = match tokio::time::timeout(timeout, adapter.invoke(&request)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let message = match result {
        Ok(corrected_text) => {
            info!(
                request_id = %request_id,
                provider = %adapter.id(),
                elapsed_ms,
                corrected = %preview(&corrected_text, 100),
                "Correction succeeded"
            );
            DispatcherMessage::TextCorrected {
                request_id: request_id.clone(),
                corrected_text,
            }
        }
        Err(e) => {
            error!(
                request_id = %request_id,
                provider = %adapter.id(),
                status = ?e.http_status(),
                elapsed_ms,
                "Correction failed: {}", e
            );
            DispatcherMessage::TextCorrectionError {
                request_id: request_id.clone(),
                error: e.to_string(),
            }
        }
    };

    if let Err(e) = outbox.push(&tab, message).await {
        warn!(
            request_id = %request_id,
            tab = %tab,
            "Could not deliver correction result: {}", e
        );
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
