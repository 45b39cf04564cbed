//! Wire messages exchanged between page agents and the dispatcher.
//!
//! All messages are JSON objects tagged by `type` with camelCase fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{InputId, RequestId};

/// Page -> Dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PageMessage {
    CorrectText(CorrectTextRequest),
    ShortcutActivated {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active_element: Option<ElementInfo>,
    },
    ShortcutNoInput {
        url: String,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active_element: Option<ElementInfo>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        settings_status: Option<SettingsStatus>,
    },
}

/// Body of a `correctText` message.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectTextRequest {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_type: Option<String>,
    pub request_id: RequestId,
    pub input_id: InputId,
    #[serde(default)]
    pub url: String,
}

impl fmt::Debug for CorrectTextRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectTextRequest")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("text", &preview(&self.text, 50))
            .field("function_type", &self.function_type)
            .field("request_id", &self.request_id)
            .field("input_id", &self.input_id)
            .field("url", &self.url)
            .finish()
    }
}

/// Synchronous answer to a `correctText` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DispatchAck {
    /// The request was routed; its outcome will be pushed later.
    Accepted { request_id: RequestId },
    /// The request will never produce a push.
    Rejected { request_id: RequestId, error: String },
}

impl DispatchAck {
    pub fn request_id(&self) -> &RequestId {
        match self {
            DispatchAck::Accepted { request_id } | DispatchAck::Rejected { request_id, .. } => {
                request_id
            }
        }
    }
}

/// Dispatcher -> Page asynchronous push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DispatcherMessage {
    TextCorrected {
        request_id: RequestId,
        corrected_text: String,
    },
    TextCorrectionError {
        request_id: RequestId,
        error: String,
    },
    SettingsUpdated,
    ExtensionInstalled {
        reason: String,
    },
}

impl DispatcherMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatcherMessage::TextCorrected { .. } => "textCorrected",
            DispatcherMessage::TextCorrectionError { .. } => "textCorrectionError",
            DispatcherMessage::SettingsUpdated => "settingsUpdated",
            DispatcherMessage::ExtensionInstalled { .. } => "extensionInstalled",
        }
    }
}

/// Description of the focused element, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub is_content_editable: bool,
}

/// Which required settings are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsStatus {
    pub has_provider: bool,
    pub has_api_key: bool,
    pub has_model: bool,
}

impl SettingsStatus {
    pub fn is_complete(&self) -> bool {
        self.has_provider && self.has_api_key && self.has_model
    }
}

/// First `max_chars` characters of `text`, with `...` when truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
