//! Page -> dispatcher send path.

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use inline_protocols::{DispatchAck, DispatchEndpoint, PageMessage, TabId, TransportError};

/// Sends page messages to the dispatcher.
///
/// `Ok(None)` means the message was delivered and no synchronous answer is
/// expected (diagnostics). Results of a `correctText` never come back here;
/// they arrive as pushes handled by
/// [`PageSession::handle_message`](crate::PageSession::handle_message).
#[async_trait(?Send)]
pub trait DispatcherLink {
    async fn send(&self, message: PageMessage) -> Result<Option<DispatchAck>, TransportError>;
}

/// Direct link to an in-process dispatcher.
///
/// The link does not keep the dispatcher alive. Once the last owner drops
/// it, sends fail with [`TransportError::NoReceiver`].
pub struct EndpointLink {
    endpoint: Weak<dyn DispatchEndpoint>,
    tab: TabId,
}

impl EndpointLink {
    pub fn new(endpoint: &Arc<dyn DispatchEndpoint>, tab: TabId) -> Self {
        Self {
            endpoint: Arc::downgrade(endpoint),
            tab,
        }
    }

    pub fn tab(&self) -> &TabId {
        &self.tab
    }
}

#[async_trait(?Send)]
impl DispatcherLink for EndpointLink {
    async fn send(&self, message: PageMessage) -> Result<Option<DispatchAck>, TransportError> {
        let endpoint = self.endpoint.upgrade().ok_or(TransportError::NoReceiver)?;
        Ok(endpoint.handle(&self.tab, message))
    }
}
