use std::cell::RefCell;

use async_trait::async_trait;
use inline_config::{MemorySettingsStore, StoredSettings};
use inline_protocols::TransportError;

use super::*;
use crate::memory_dom::{MemoryDocument, MemoryElement};
use crate::spinner::CONTAINER_CLASS;

#[derive(Clone, Copy)]
enum Reply {
    Accept,
    Reject,
    Silent,
    Fail,
}

struct FakeLink {
    reply: RefCell<Reply>,
    sent: RefCell<Vec<PageMessage>>,
}

impl FakeLink {
    fn new(reply: Reply) -> Rc<Self> {
        Rc::new(Self {
            reply: RefCell::new(reply),
            sent: RefCell::new(Vec::new()),
        })
    }

    fn sent_types(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .map(serde_type)
            .collect()
    }

    fn last_request(&self) -> CorrectTextRequest {
        self.sent
            .borrow()
            .iter()
            .rev()
            .find_map(|m| match m {
                PageMessage::CorrectText(request) => Some(request.clone()),
                _ => None,
            })
            .unwrap()
    }
}

fn serde_type(message: &PageMessage) -> String {
    match message {
        PageMessage::CorrectText(_) => "correctText",
        PageMessage::ShortcutActivated { .. } => "shortcutActivated",
        PageMessage::ShortcutNoInput { .. } => "shortcutNoInput",
    }
    .to_string()
}

#[async_trait(?Send)]
impl DispatcherLink for FakeLink {
    async fn send(&self, message: PageMessage) -> Result<Option<DispatchAck>, TransportError> {
        let request_id = match &message {
            PageMessage::CorrectText(request) => Some(request.request_id.clone()),
            _ => None,
        };
        self.sent.borrow_mut().push(message);

        let Some(request_id) = request_id else {
            return Ok(None);
        };
        match *self.reply.borrow() {
            Reply::Accept => Ok(Some(DispatchAck::Accepted { request_id })),
            Reply::Reject => Ok(Some(DispatchAck::Rejected {
                request_id,
                error: "Unknown provider: acme".to_string(),
            })),
            Reply::Silent => Ok(None),
            Reply::Fail => Err(TransportError::NoReceiver),
        }
    }
}

fn complete_settings() -> StoredSettings {
    let mut settings = StoredSettings {
        provider: Some("openai".to_string()),
        model: Some("gpt-4o-mini".to_string()),
        ..Default::default()
    };
    settings.set_api_key("openai", "sk-test");
    settings
}

struct Harness {
    doc: Rc<MemoryDocument>,
    link: Rc<FakeLink>,
    store: Arc<MemorySettingsStore>,
    session: PageSession,
}

async fn harness_with(reply: Reply, settings: StoredSettings) -> Harness {
    let doc = Rc::new(MemoryDocument::new("https://example.com/compose"));
    let link = FakeLink::new(reply);
    let store = Arc::new(MemorySettingsStore::new(settings));
    let session = PageSession::start(doc.clone(), link.clone(), store.clone())
        .await
        .unwrap();
    Harness {
        doc,
        link,
        store,
        session,
    }
}

async fn harness(reply: Reply) -> Harness {
    harness_with(reply, complete_settings()).await
}

fn fix_language() -> KeyEvent {
    KeyEvent::new("t").meta().ctrl().shift()
}

fn rephrase() -> KeyEvent {
    KeyEvent::new("r").meta().ctrl().shift()
}

fn focused_textarea(h: &Harness, text: &str) -> Rc<MemoryElement> {
    let area = h.doc.create_textarea();
    area.type_text(text);
    h.doc.focus(&area);
    area
}

fn pending_id(disposition: &KeyDisposition) -> RequestId {
    match disposition {
        KeyDisposition::Submitted {
            outcome: SubmitOutcome::Pending(id),
            ..
        } => id.clone(),
        other => panic!("expected a pending submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fix_language_round_trip() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo wrld");

    let disposition = h.session.handle_key(&fix_language()).await;
    assert!(disposition.suppresses_default());
    let id = pending_id(&disposition);
    assert!(h.session.is_pending(&id));
    assert!(h.session.has_spinner(&*area));
    assert_eq!(area.overlays(), vec![CONTAINER_CLASS]);

    let request = h.link.last_request();
    assert_eq!(request.text, "helo wrld");
    assert_eq!(request.function_type.as_deref(), Some("fix_language"));
    assert_eq!(request.api_key, "sk-test");
    assert_eq!(request.url, "https://example.com/compose");
    assert_eq!(
        area.data_attribute(InputId::ATTRIBUTE).as_deref(),
        Some(request.input_id.as_str())
    );

    h.session
        .handle_message(DispatcherMessage::TextCorrected {
            request_id: id.clone(),
            corrected_text: "Hello world.".to_string(),
        })
        .await;

    assert_eq!(area.text(), "Hello world.");
    assert_eq!(area.input_events(), 1);
    assert!(!h.session.has_spinner(&*area));
    assert!(area.overlays().is_empty());
    assert!(!h.session.is_pending(&id));
}

#[tokio::test]
async fn test_shortcut_activated_sent_first() {
    let h = harness(Reply::Accept).await;
    focused_textarea(&h, "helo");

    h.session.handle_key(&fix_language()).await;
    assert_eq!(h.link.sent_types(), vec!["shortcutActivated", "correctText"]);
}

#[tokio::test]
async fn test_rephrase_uses_its_function_type() {
    let h = harness(Reply::Accept).await;
    focused_textarea(&h, "send me the file");

    let disposition = h.session.handle_key(&rephrase()).await;
    assert!(matches!(
        disposition,
        KeyDisposition::Submitted {
            function: CorrectionFunction::RephraseFriendlyProfessional,
            ..
        }
    ));
    assert_eq!(
        h.link.last_request().function_type.as_deref(),
        Some("rephrase_as_friendly_and_professional")
    );
}

#[tokio::test]
async fn test_unmatched_key_propagates() {
    let h = harness(Reply::Accept).await;
    focused_textarea(&h, "helo");

    let disposition = h.session.handle_key(&KeyEvent::new("a").shift()).await;
    assert_eq!(disposition, KeyDisposition::Propagate);
    assert!(h.link.sent.borrow().is_empty());
}

#[tokio::test]
async fn test_non_editable_div_is_reported_not_suppressed() {
    let h = harness(Reply::Accept).await;
    let div = h.doc.create_element("div");
    h.doc.focus(&div);

    let disposition = h.session.handle_key(&fix_language()).await;
    assert!(!disposition.suppresses_default());
    assert_eq!(
        disposition,
        KeyDisposition::NoOp {
            function: CorrectionFunction::FixLanguage,
            reason: NoOpReason::NotEligible,
        }
    );
    assert_eq!(h.session.pending_count(), 0);

    let sent = h.link.sent.borrow();
    match sent.last().unwrap() {
        PageMessage::ShortcutNoInput {
            reason,
            active_element,
            settings_status,
            ..
        } => {
            assert_eq!(reason, "not eligible");
            assert_eq!(active_element.as_ref().unwrap().tag_name, "DIV");
            assert!(settings_status.is_none());
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_input_is_reported() {
    let h = harness(Reply::Accept).await;
    focused_textarea(&h, "   ");

    let disposition = h.session.handle_key(&fix_language()).await;
    assert_eq!(
        disposition,
        KeyDisposition::NoOp {
            function: CorrectionFunction::FixLanguage,
            reason: NoOpReason::EmptyInput,
        }
    );
    assert_eq!(h.session.pending_count(), 0);
}

#[tokio::test]
async fn test_incomplete_settings_reported_with_status() {
    let mut settings = complete_settings();
    settings.model = None;
    let h = harness_with(Reply::Accept, settings).await;
    let area = focused_textarea(&h, "helo");

    let disposition = h.session.handle_key(&fix_language()).await;
    assert!(!disposition.suppresses_default());
    assert!(!h.session.has_spinner(&*area));

    let sent = h.link.sent.borrow();
    match sent.last().unwrap() {
        PageMessage::ShortcutNoInput {
            reason,
            settings_status,
            ..
        } => {
            assert_eq!(reason, "settings incomplete");
            let status = settings_status.unwrap();
            assert!(status.has_provider);
            assert!(status.has_api_key);
            assert!(!status.has_model);
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[tokio::test]
async fn test_silent_dispatcher_keeps_request_pending() {
    let h = harness(Reply::Silent).await;
    let area = focused_textarea(&h, "helo");

    let id = pending_id(&h.session.handle_key(&fix_language()).await);
    assert!(h.session.is_pending(&id));
    assert!(h.session.has_spinner(&*area));
}

#[tokio::test]
async fn test_rejected_request_is_closed() {
    let h = harness(Reply::Reject).await;
    let area = focused_textarea(&h, "helo");

    let disposition = h.session.handle_key(&fix_language()).await;
    match &disposition {
        KeyDisposition::Submitted {
            outcome: SubmitOutcome::Rejected { error, .. },
            ..
        } => assert!(error.contains("acme")),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(h.session.pending_count(), 0);
    assert!(!h.session.has_spinner(&*area));
    assert_eq!(area.text(), "helo");
}

#[tokio::test]
async fn test_send_failure_is_closed() {
    let h = harness(Reply::Fail).await;
    let area = focused_textarea(&h, "helo");

    let disposition = h.session.handle_key(&fix_language()).await;
    assert!(matches!(
        disposition,
        KeyDisposition::Submitted {
            outcome: SubmitOutcome::SendFailed { .. },
            ..
        }
    ));
    assert_eq!(h.session.pending_count(), 0);
    assert!(!h.session.has_spinner(&*area));
    assert!(area.overlays().is_empty());
}

#[tokio::test]
async fn test_detached_element_not_mutated() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo wrld");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    h.doc.remove(&area);
    let result = h.session.resolve_success(&id, "Hello world.");

    assert!(matches!(result, Err(CorrelationError::ElementDetached(_))));
    assert_eq!(area.text(), "helo wrld");
    assert_eq!(area.input_events(), 0);
    assert!(!h.session.has_spinner(&*area));
    assert!(!h.session.is_pending(&id));
}

#[tokio::test]
async fn test_dropped_element_is_discarded() {
    let h = harness(Reply::Accept).await;
    let id = {
        let area = focused_textarea(&h, "helo");
        let id = pending_id(&h.session.handle_key(&fix_language()).await);
        h.doc.remove(&area);
        id
    };

    let result = h.session.resolve_success(&id, "Hello.");
    assert!(matches!(result, Err(CorrelationError::ElementGone(_))));
    assert_eq!(h.session.pending_count(), 0);
}

#[tokio::test]
async fn test_recycled_element_not_mutated() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    // The page reuses the node for something else.
    area.set_data_attribute(InputId::ATTRIBUTE, "inline-0-other");
    area.type_text("unrelated");

    let result = h.session.resolve_success(&id, "Hello.");
    assert!(matches!(
        result,
        Err(CorrelationError::InputIdMismatch { .. })
    ));
    assert_eq!(area.text(), "unrelated");
    assert!(!h.session.has_spinner(&*area));
    assert!(!h.session.is_pending(&id));
}

#[tokio::test]
async fn test_two_elements_resolve_out_of_order() {
    let h = harness(Reply::Accept).await;
    let first = focused_textarea(&h, "frist");
    let first_id = pending_id(&h.session.handle_key(&fix_language()).await);
    let second = focused_textarea(&h, "secnod");
    let second_id = pending_id(&h.session.handle_key(&fix_language()).await);

    assert_ne!(first_id, second_id);
    assert_eq!(h.session.pending_count(), 2);

    h.session.resolve_success(&second_id, "Second.").unwrap();
    assert_eq!(second.text(), "Second.");
    assert_eq!(first.text(), "frist");
    assert!(h.session.has_spinner(&*first));

    h.session.resolve_success(&first_id, "First.").unwrap();
    assert_eq!(first.text(), "First.");
    assert_eq!(second.text(), "Second.");
    assert_eq!(h.session.pending_count(), 0);
}

#[tokio::test]
async fn test_error_leaves_text_unchanged() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    h.session
        .handle_message(DispatcherMessage::TextCorrectionError {
            request_id: id.clone(),
            error: "API error: 429".to_string(),
        })
        .await;

    assert_eq!(area.text(), "helo");
    assert_eq!(area.input_events(), 0);
    assert!(!h.session.has_spinner(&*area));
    assert!(!h.session.is_pending(&id));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    h.session.resolve_success(&id, "Hello.").unwrap();
    let again = h.session.resolve_success(&id, "Hello again.");
    assert!(matches!(again, Err(CorrelationError::UnknownRequest(_))));
    assert!(matches!(
        h.session.resolve_error(&id, "late"),
        Err(CorrelationError::UnknownRequest(_))
    ));

    assert_eq!(area.text(), "Hello.");
    assert_eq!(area.input_events(), 1);
}

#[tokio::test]
async fn test_error_then_success_applies_nothing() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    h.session.resolve_error(&id, "timeout").unwrap();
    assert!(h.session.resolve_success(&id, "Hello.").is_err());
    assert_eq!(area.text(), "helo");
}

#[tokio::test]
async fn test_unknown_id_hides_tracked_spinners() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    let result = h.session.resolve_success(&RequestId::new("req-0-999"), "stray");
    assert!(matches!(result, Err(CorrelationError::UnknownRequest(_))));
    assert!(!h.session.has_spinner(&*area));
    assert_eq!(area.text(), "helo");
    // The request itself stays open for its real result.
    assert!(h.session.is_pending(&id));
}

#[tokio::test]
async fn test_push_decoded_from_json_correlates() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");
    let id = pending_id(&h.session.handle_key(&fix_language()).await);

    let json = format!(
        r#"{{"type":"textCorrected","requestId":"{}","correctedText":"Hello."}}"#,
        id
    );
    let message: DispatcherMessage = serde_json::from_str(&json).unwrap();
    h.session.handle_message(message).await;

    assert_eq!(area.text(), "Hello.");
}

#[tokio::test]
async fn test_same_element_reuses_input_id() {
    let h = harness(Reply::Accept).await;
    let area = focused_textarea(&h, "helo");

    let first = pending_id(&h.session.handle_key(&fix_language()).await);
    let first_input = h.link.last_request().input_id;
    h.session.resolve_error(&first, "boom").unwrap();

    area.type_text("helo again");
    h.session.handle_key(&fix_language()).await;
    assert_eq!(h.link.last_request().input_id, first_input);
}

#[tokio::test]
async fn test_settings_updated_reloads_cache() {
    let h = harness_with(Reply::Accept, StoredSettings::default()).await;
    assert!(!h.session.settings().is_complete());

    h.store.save(complete_settings()).await.unwrap();
    h.session
        .handle_message(DispatcherMessage::SettingsUpdated)
        .await;
    assert!(h.session.settings().is_complete());
}

#[tokio::test]
async fn test_installed_reloads_shortcuts() {
    let h = harness(Reply::Accept).await;
    let mut settings = complete_settings();
    settings.set_shortcut(
        CorrectionFunction::FixLanguage,
        &inline_protocols::Chord::new(["Control", "K"]).unwrap(),
    );
    h.store.save(settings).await.unwrap();

    h.session
        .handle_message(DispatcherMessage::ExtensionInstalled {
            reason: "service_worker_started".to_string(),
        })
        .await;

    focused_textarea(&h, "helo");
    let disposition = h.session.handle_key(&KeyEvent::new("k").ctrl()).await;
    assert!(disposition.suppresses_default());
}
