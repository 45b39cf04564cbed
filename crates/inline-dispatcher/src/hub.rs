//! In-process push channel to page agents.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use inline_protocols::{ChannelError, DispatcherMessage, TabId, TabOutbox};

/// Connected tabs, each with its own unbounded inbox.
pub struct TabHub {
    tabs: DashMap<TabId, mpsc::UnboundedSender<DispatcherMessage>>,
}

impl TabHub {
    pub fn new() -> Self {
        Self {
            tabs: DashMap::new(),
        }
    }

    /// Register a tab and return the receiving half of its inbox.
    ///
    /// Connecting an id twice replaces the previous inbox.
    pub fn connect(&self, tab: TabId) -> mpsc::UnboundedReceiver<DispatcherMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        debug!(tab = %tab, "Tab connected");
        self.tabs.insert(tab, tx);
        rx
    }

    /// Forget a tab. Returns whether it was known.
    pub fn disconnect(&self, tab: &TabId) -> bool {
        let removed = self.tabs.remove(tab).is_some();
        if removed {
            debug!(tab = %tab, "Tab disconnected");
        }
        removed
    }

    pub fn is_connected(&self, tab: &TabId) -> bool {
        self.tabs.contains_key(tab)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl Default for TabHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TabOutbox for TabHub {
    async fn push(&self, tab: &TabId, message: DispatcherMessage) -> Result<(), ChannelError> {
        let sender = self
            .tabs
            .get(tab)
            .map(|s| s.clone())
            .ok_or_else(|| ChannelError::NotFound(tab.to_string()))?;

        if sender.send(message).is_err() {
            // Receiver dropped: the page went away.
            self.tabs.remove(tab);
            return Err(ChannelError::Disconnected);
        }
        Ok(())
    }

    fn tabs(&self) -> Vec<TabId> {
        self.tabs.iter().map(|e| e.key().clone()).collect()
    }
}
