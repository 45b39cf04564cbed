//! Channel protocol definitions.
//!
//! ## Core Concepts
//!
//! - **TabId**: identifies the page agent a request came from; every push-back
//!   is addressed to the tab that originated the request ("reply to origin")
//! - **DispatchEndpoint**: the dispatcher's synchronous entry point, returning
//!   an acknowledgement for correction requests
//! - **TabOutbox**: the asynchronous push channel back to page agents

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::message::{DispatchAck, DispatcherMessage, PageMessage};

/// Identifier of one page agent (browser tab, WebSocket connection, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A random tab id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Push channel from the dispatcher to page agents.
#[async_trait]
pub trait TabOutbox: Send + Sync {
    /// Deliver one message to a tab. Failures are terminal for that message.
    async fn push(&self, tab: &TabId, message: DispatcherMessage) -> Result<(), ChannelError>;

    /// Tabs currently reachable, for broadcasts.
    fn tabs(&self) -> Vec<TabId>;
}

/// Synchronous entry point of the dispatcher.
///
/// Returns `Some` only for messages that expect an acknowledgement
/// (`correctText`). Must not block on provider I/O.
pub trait DispatchEndpoint: Send + Sync {
    fn handle(&self, tab: &TabId, message: PageMessage) -> Option<DispatchAck>;

    /// A transport registered a new tab and can push to it.
    fn tab_connected(&self, _tab: &TabId) {}
}
