//! Frames sent from the server to a page agent.
//!
//! Page agents send bare [`PageMessage`](inline_protocols::PageMessage) JSON.
//! The server wraps its side so acknowledgements and pushes can share one
//! socket.

use serde::{Deserialize, Serialize};

use inline_protocols::{DispatchAck, DispatcherMessage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Synchronous answer to a `correctText`.
    Ack { ack: DispatchAck },
    /// Asynchronous dispatcher push.
    Push { message: DispatcherMessage },
    /// The inbound frame could not be understood.
    Error { error: String },
}

impl ServerFrame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inline_protocols::RequestId;

    #[test]
    fn test_ack_frame_shape() {
        let frame = ServerFrame::Ack {
            ack: DispatchAck::Accepted {
                request_id: RequestId::new("req-1"),
            },
        };
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "ack");
        assert_eq!(json["ack"]["type"], "accepted");
        assert_eq!(json["ack"]["requestId"], "req-1");
    }

    #[test]
    fn test_push_frame_shape() {
        let frame = ServerFrame::Push {
            message: DispatcherMessage::TextCorrected {
                request_id: RequestId::new("req-2"),
                corrected_text: "Hi.".to_string(),
            },
        };
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "push");
        assert_eq!(json["message"]["type"], "textCorrected");
        assert_eq!(json["message"]["correctedText"], "Hi.");
    }

    #[test]
    fn test_frame_parses_back() {
        let frame = ServerFrame::Push {
            message: DispatcherMessage::SettingsUpdated,
        };
        let parsed: ServerFrame = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(parsed, frame);
    }
}
