//! Push-back channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Tab not found: {0}")]
    NotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Channel disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ChannelError::NotFound("tab-1".to_string());
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("tab-1"));
    }

    #[test]
    fn test_send_failed_error() {
        let err = ChannelError::SendFailed("buffer full".to_string());
        let display = err.to_string();
        assert!(display.contains("Send failed"));
        assert!(display.contains("buffer full"));
    }

    #[test]
    fn test_disconnected_error() {
        let err = ChannelError::Disconnected;
        assert!(err.to_string().contains("disconnected"));
    }
}
