//! Page session: the per-document owner of pending requests and spinners.
//!
//! One [`PageSession`] is created when the page agent starts on a document
//! and dropped with it. Everything runs on the page's single thread, so the
//! stores use `RefCell`; no borrow is held across an `.await`.
//!
//! A request lives from [`PageSession::submit`] until exactly one of:
//!
//! - a `textCorrected` push ([`PageSession::resolve_success`])
//! - a `textCorrectionError` push ([`PageSession::resolve_error`])
//! - a rejected acknowledgement or failed send
//!
//! Removing the id from the store is the terminal transition, so a second
//! delivery for the same id finds nothing and does nothing.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use inline_config::{ConfigError, ResolvedSettings, SettingsStore};
use inline_protocols::message::preview;
use inline_protocols::{
    CorrectTextRequest, CorrectionFunction, DispatchAck, DispatcherMessage, InputId, PageMessage,
    RequestId,
};

use crate::detector::{self, Detection, KeyEvent, NoOpReason};
use crate::dom::{PageDocument, PageElement};
use crate::link::DispatcherLink;
use crate::pending::{self, PendingRequest, PendingStore, RequestIdAllocator};
use crate::spinner::SpinnerManager;

/// A push that could not be applied. Logged, never surfaced to the user.
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("No pending request {0}")]
    UnknownRequest(RequestId),

    #[error("Element of request {0} no longer exists")]
    ElementGone(RequestId),

    #[error("Element of request {0} was detached from the document")]
    ElementDetached(RequestId),

    #[error("Element of request {request_id} was recycled (expected {expected}, found {found:?})")]
    InputIdMismatch {
        request_id: RequestId,
        expected: InputId,
        found: Option<InputId>,
    },
}

/// What happened to a submitted request on the send path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted; the outcome will arrive as a push.
    Pending(RequestId),
    /// The dispatcher refused it; the request is already closed.
    Rejected { request_id: RequestId, error: String },
    /// Delivery failed; the request is already closed.
    SendFailed { request_id: RequestId, error: String },
}

impl SubmitOutcome {
    pub fn request_id(&self) -> &RequestId {
        match self {
            SubmitOutcome::Pending(request_id)
            | SubmitOutcome::Rejected { request_id, .. }
            | SubmitOutcome::SendFailed { request_id, .. } => request_id,
        }
    }
}

/// Result of handling one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not a configured shortcut.
    Propagate,
    /// Shortcut matched but nothing was submitted.
    NoOp {
        function: CorrectionFunction,
        reason: NoOpReason,
    },
    /// A correction was submitted.
    Submitted {
        function: CorrectionFunction,
        outcome: SubmitOutcome,
    },
}

impl KeyDisposition {
    /// Whether the host should call `preventDefault` and `stopPropagation`.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, KeyDisposition::Submitted { .. })
    }
}

pub struct PageSession {
    document: Rc<dyn PageDocument>,
    link: Rc<dyn DispatcherLink>,
    settings_store: Arc<dyn SettingsStore>,
    settings: RefCell<ResolvedSettings>,
    pending: RefCell<PendingStore>,
    spinners: RefCell<SpinnerManager>,
    ids: RefCell<RequestIdAllocator>,
}

impl PageSession {
    /// Create a session with default settings. Call
    /// [`reload_settings`](Self::reload_settings) before handling keys.
    pub fn new(
        document: Rc<dyn PageDocument>,
        link: Rc<dyn DispatcherLink>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            document,
            link,
            settings_store,
            settings: RefCell::new(ResolvedSettings::default()),
            pending: RefCell::new(PendingStore::new()),
            spinners: RefCell::new(SpinnerManager::new()),
            ids: RefCell::new(RequestIdAllocator::new()),
        }
    }

    /// Create a session and load its settings.
    pub async fn start(
        document: Rc<dyn PageDocument>,
        link: Rc<dyn DispatcherLink>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Result<Self, ConfigError> {
        let session = Self::new(document, link, settings_store);
        session.reload_settings().await?;
        info!(url = %session.document.url(), "Page agent started");
        Ok(session)
    }

    pub async fn reload_settings(&self) -> Result<(), ConfigError> {
        let resolved = self.settings_store.load().await?.resolve();
        let shortcuts: Vec<String> = resolved
            .shortcuts
            .iter()
            .map(|(function, chord)| format!("{}={}", function, chord))
            .collect();
        info!(
            provider = ?resolved.provider,
            has_api_key = resolved.api_key.is_some(),
            has_model = resolved.model.is_some(),
            shortcuts = ?shortcuts,
            "Loaded settings"
        );
        *self.settings.borrow_mut() = resolved;
        Ok(())
    }

    /// Run a key event through detection and, when everything is in place,
    /// submit a correction.
    ///
    /// Suppression is decided before the first `.await`, so a browser binding
    /// can call `preventDefault` from [`detect`](Self::detect) synchronously.
    pub async fn handle_key(&self, event: &KeyEvent) -> KeyDisposition {
        let detection = self.detect(event);
        let Some(function) = detection.function() else {
            return KeyDisposition::Propagate;
        };

        let url = self.document.url();
        let active_element = self.document.active_element().map(|e| e.info());
        info!(
            function = %function,
            url = %url,
            element = ?active_element.as_ref().map(|e| e.tag_name.as_str()),
            "Keyboard shortcut activated"
        );
        self.send_diagnostic(PageMessage::ShortcutActivated {
            url: url.clone(),
            active_element,
        })
        .await;

        match detection {
            Detection::NoMatch => KeyDisposition::Propagate,
            Detection::NoOp {
                function,
                reason,
                element,
            } => {
                self.report_no_op(function, &reason, element.as_deref(), url)
                    .await;
                KeyDisposition::NoOp { function, reason }
            }
            Detection::Submit {
                function,
                element,
                text,
            } => match self.submit(element.clone(), function, text).await {
                Ok(outcome) => KeyDisposition::Submitted { function, outcome },
                Err(reason) => {
                    self.report_no_op(function, &reason, Some(element.as_ref()), url)
                        .await;
                    KeyDisposition::NoOp { function, reason }
                }
            },
        }
    }

    /// Synchronous part of [`handle_key`](Self::handle_key).
    pub fn detect(&self, event: &KeyEvent) -> Detection {
        let settings = self.settings.borrow();
        detector::detect(self.document.as_ref(), &settings, event)
    }

    /// Register a pending request, show the spinner and send `correctText`.
    ///
    /// Fails only when the settings are incomplete, before anything is
    /// registered.
    pub async fn submit(
        &self,
        element: Rc<dyn PageElement>,
        function: CorrectionFunction,
        text: String,
    ) -> Result<SubmitOutcome, NoOpReason> {
        let settings = self.settings.borrow().clone();
        let status = settings.status();
        let (Some(provider), Some(api_key), Some(model)) =
            (settings.provider, settings.api_key, settings.model)
        else {
            return Err(NoOpReason::SettingsIncomplete(status));
        };

        let request_id = self.ids.borrow_mut().next_id();
        let input_id = pending::input_id_for(element.as_ref());
        info!(
            request_id = %request_id,
            function = %function,
            input_id = %input_id,
            element = %element.tag_name(),
            text_length = text.len(),
            text_preview = %preview(&text, 50),
            provider = %provider,
            model = %model,
            "Processing text correction request"
        );

        self.pending.borrow_mut().insert(
            request_id.clone(),
            PendingRequest::new(&element, input_id.clone(), function, text.clone()),
        );
        self.spinners
            .borrow_mut()
            .show(self.document.as_ref(), element.as_ref());

        let message = PageMessage::CorrectText(CorrectTextRequest {
            provider,
            api_key,
            model,
            text,
            function_type: Some(function.as_str().to_string()),
            request_id: request_id.clone(),
            input_id,
            url: self.document.url(),
        });

        match self.link.send(message).await {
            Ok(Some(DispatchAck::Accepted { .. })) | Ok(None) => {
                debug!(request_id = %request_id, "Correction request accepted");
                Ok(SubmitOutcome::Pending(request_id))
            }
            Ok(Some(DispatchAck::Rejected { error, .. })) => {
                error!(request_id = %request_id, error = %error, "Correction request rejected");
                self.abandon(&request_id);
                Ok(SubmitOutcome::Rejected { request_id, error })
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Error sending correction request");
                self.abandon(&request_id);
                Ok(SubmitOutcome::SendFailed {
                    request_id,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Apply a corrected text to the element of `request_id`.
    pub fn resolve_success(
        &self,
        request_id: &RequestId,
        corrected_text: &str,
    ) -> Result<(), CorrelationError> {
        let removed = self.pending.borrow_mut().remove(request_id);
        let Some(request) = removed else {
            let tracked = self.pending.borrow().live_elements();
            warn!(
                request_id = %request_id,
                active_requests = tracked.len(),
                "Received correction but no matching request found"
            );
            let mut spinners = self.spinners.borrow_mut();
            for element in &tracked {
                spinners.hide(element.as_ref());
            }
            return Err(CorrelationError::UnknownRequest(request_id.clone()));
        };

        let Some(element) = request.element() else {
            self.spinners.borrow_mut().forget(request.element_key);
            warn!(request_id = %request_id, input_id = %request.input_id, "Element of request no longer exists");
            return Err(CorrelationError::ElementGone(request_id.clone()));
        };

        self.spinners.borrow_mut().hide(element.as_ref());

        if !element.is_connected() {
            warn!(request_id = %request_id, "Element was detached, not applying correction");
            return Err(CorrelationError::ElementDetached(request_id.clone()));
        }

        let current = pending::current_input_id(element.as_ref());
        if current.as_ref() != Some(&request.input_id) {
            warn!(
                request_id = %request_id,
                expected = %request.input_id,
                current = ?current,
                "Input element id mismatch, not applying correction"
            );
            return Err(CorrelationError::InputIdMismatch {
                request_id: request_id.clone(),
                expected: request.input_id,
                found: current,
            });
        }

        element.set_text(corrected_text);
        info!(
            request_id = %request_id,
            original_length = request.original_text.len(),
            corrected_length = corrected_text.len(),
            corrected_preview = %preview(corrected_text, 50),
            elapsed_ms = (chrono::Utc::now() - request.created_at).num_milliseconds(),
            "Text correction applied"
        );
        Ok(())
    }

    /// Close `request_id` after a provider failure. Never retried.
    pub fn resolve_error(&self, request_id: &RequestId, error: &str) -> Result<(), CorrelationError> {
        let removed = self.pending.borrow_mut().remove(request_id);
        let Some(request) = removed else {
            debug!(request_id = %request_id, "Error for unknown request ignored");
            return Err(CorrelationError::UnknownRequest(request_id.clone()));
        };

        warn!(request_id = %request_id, error = %error, "Text correction failed");
        self.hide_spinner_of(&request);
        Ok(())
    }

    /// Entry point for dispatcher pushes.
    pub async fn handle_message(&self, message: DispatcherMessage) {
        match message {
            DispatcherMessage::TextCorrected {
                request_id,
                corrected_text,
            } => {
                if let Err(e) = self.resolve_success(&request_id, &corrected_text) {
                    debug!(error = %e, "Correction discarded");
                }
            }
            DispatcherMessage::TextCorrectionError { request_id, error } => {
                error!(request_id = %request_id, error = %error, "Received error from dispatcher");
                if let Err(e) = self.resolve_error(&request_id, &error) {
                    debug!(error = %e, "Error push discarded");
                }
            }
            DispatcherMessage::SettingsUpdated => {
                info!("Settings updated, reloading");
                if let Err(e) = self.reload_settings().await {
                    error!("Failed to reload settings: {}", e);
                }
            }
            DispatcherMessage::ExtensionInstalled { reason } => {
                info!(reason = %reason, "Dispatcher (re)started, reloading settings");
                if let Err(e) = self.reload_settings().await {
                    error!("Failed to reload settings: {}", e);
                }
            }
        }
    }

    pub fn settings(&self) -> ResolvedSettings {
        self.settings.borrow().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_pending(&self, request_id: &RequestId) -> bool {
        self.pending.borrow().contains(request_id)
    }

    pub fn pending_ids(&self) -> Vec<RequestId> {
        self.pending.borrow().ids()
    }

    pub fn has_spinner(&self, element: &dyn PageElement) -> bool {
        self.spinners.borrow().is_showing(element.key())
    }

    pub fn document(&self) -> &Rc<dyn PageDocument> {
        &self.document
    }

    fn abandon(&self, request_id: &RequestId) {
        let removed = self.pending.borrow_mut().remove(request_id);
        if let Some(request) = removed {
            self.hide_spinner_of(&request);
        }
    }

    fn hide_spinner_of(&self, request: &PendingRequest) {
        let mut spinners = self.spinners.borrow_mut();
        match request.element() {
            Some(element) => {
                spinners.hide(element.as_ref());
            }
            None => spinners.forget(request.element_key),
        }
    }

    async fn report_no_op(
        &self,
        function: CorrectionFunction,
        reason: &NoOpReason,
        element: Option<&dyn PageElement>,
        url: String,
    ) {
        let active_element = element.map(|e| e.info());
        match reason {
            NoOpReason::SettingsIncomplete(status) => warn!(
                function = %function,
                has_provider = status.has_provider,
                has_api_key = status.has_api_key,
                has_model = status.has_model,
                "Shortcut activated but settings not configured"
            ),
            _ => info!(
                function = %function,
                reason = %reason,
                element = ?active_element.as_ref().map(|e| e.tag_name.as_str()),
                "Shortcut activated but no usable input"
            ),
        }

        self.send_diagnostic(PageMessage::ShortcutNoInput {
            url,
            reason: reason.to_string(),
            active_element,
            settings_status: reason.settings_status(),
        })
        .await;
    }

    async fn send_diagnostic(&self, message: PageMessage) {
        if let Err(e) = self.link.send(message).await {
            warn!(error = %e, "Failed to send diagnostic to dispatcher");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
