use super::*;
use serde_json::json;

fn sample_request() -> CorrectTextRequest {
    CorrectTextRequest {
        provider: "openai".to_string(),
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        text: "helo wrld".to_string(),
        function_type: Some("fix_language".to_string()),
        request_id: RequestId::from_parts(1_700_000_000_000, 1),
        input_id: InputId::new("inline-1-abc"),
        url: "https://example.com/".to_string(),
    }
}

#[test]
fn test_correct_text_wire_shape() {
    let json = serde_json::to_value(PageMessage::CorrectText(sample_request())).unwrap();
    assert_eq!(json["type"], "correctText");
    assert_eq!(json["apiKey"], "sk-test");
    assert_eq!(json["functionType"], "fix_language");
    assert_eq!(json["requestId"], "req-1700000000000-1");
    assert_eq!(json["inputId"], "inline-1-abc");
}

#[test]
fn test_correct_text_without_function_type() {
    let message: PageMessage = serde_json::from_value(json!({
        "type": "correctText",
        "provider": "anthropic",
        "apiKey": "k",
        "model": "claude-3-5-haiku-latest",
        "text": "hi",
        "requestId": 17,
        "inputId": "inline-x"
    }))
    .unwrap();

    match message {
        PageMessage::CorrectText(request) => {
            assert!(request.function_type.is_none());
            assert_eq!(request.request_id, RequestId::from(17u64));
            assert_eq!(request.url, "");
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn test_correct_text_debug_redacts_key() {
    let debug = format!("{:?}", sample_request());
    assert!(!debug.contains("sk-test"));
    assert!(debug.contains("***"));
}

#[test]
fn test_shortcut_no_input_wire_shape() {
    let message = PageMessage::ShortcutNoInput {
        url: "https://example.com/".to_string(),
        reason: "not eligible".to_string(),
        active_element: Some(ElementInfo {
            tag_name: "DIV".to_string(),
            ..Default::default()
        }),
        settings_status: None,
    };
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["type"], "shortcutNoInput");
    assert_eq!(json["activeElement"]["tagName"], "DIV");
    assert!(json.get("settingsStatus").is_none());
}

#[test]
fn test_dispatcher_messages_wire_shape() {
    let corrected = DispatcherMessage::TextCorrected {
        request_id: RequestId::new("req-1-1"),
        corrected_text: "Hello world.".to_string(),
    };
    let json = serde_json::to_value(&corrected).unwrap();
    assert_eq!(json["type"], "textCorrected");
    assert_eq!(json["correctedText"], "Hello world.");

    let updated = serde_json::to_value(DispatcherMessage::SettingsUpdated).unwrap();
    assert_eq!(updated, json!({"type": "settingsUpdated"}));

    let installed: DispatcherMessage =
        serde_json::from_value(json!({"type": "extensionInstalled", "reason": "update"})).unwrap();
    assert_eq!(installed.kind(), "extensionInstalled");
}

#[test]
fn test_error_push_accepts_numeric_id() {
    let message: DispatcherMessage = serde_json::from_value(json!({
        "type": "textCorrectionError",
        "requestId": 5,
        "error": "API error: 429"
    }))
    .unwrap();
    assert_eq!(
        message,
        DispatcherMessage::TextCorrectionError {
            request_id: RequestId::new("5"),
            error: "API error: 429".to_string(),
        }
    );
}

#[test]
fn test_ack_wire_shape() {
    let ack = DispatchAck::Rejected {
        request_id: RequestId::new("req-1-2"),
        error: "Unknown provider: acme".to_string(),
    };
    let json = serde_json::to_value(&ack).unwrap();
    assert_eq!(json["type"], "rejected");
    assert_eq!(ack.request_id().as_str(), "req-1-2");
}

#[test]
fn test_settings_status_complete() {
    let mut status = SettingsStatus {
        has_provider: true,
        has_api_key: true,
        has_model: true,
    };
    assert!(status.is_complete());
    status.has_api_key = false;
    assert!(!status.is_complete());
}

#[test]
fn test_preview_truncates_on_char_boundary() {
    assert_eq!(preview("short", 10), "short");
    assert_eq!(preview("héllo wörld", 5), "héllo...");
}
