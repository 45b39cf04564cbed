//! WebSocket connection management.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use inline_protocols::{ChannelError, DispatcherMessage, PageMessage, TabId};

use crate::WsChannelState;
use crate::frame::ServerFrame;

const OUTBOUND_BUFFER: usize = 32;

/// A WebSocket connection to one page agent.
#[derive(Clone)]
pub struct WsConnection {
    /// Tab id assigned to this connection.
    pub tab: TabId,
    /// Pushes waiting to be written to the socket.
    tx: mpsc::Sender<DispatcherMessage>,
    open: Arc<AtomicBool>,
}

impl WsConnection {
    /// Register a connection in `state` and spawn its handler task.
    ///
    /// The entry is in place before the handler runs, so the handler's
    /// removal on close always finds it.
    pub fn spawn(tab: TabId, socket: WebSocket, state: Arc<WsChannelState>) -> Self {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let open = Arc::new(AtomicBool::new(true));

        let conn = Self {
            tab: tab.clone(),
            tx,
            open: open.clone(),
        };
        state.connections.insert(tab.clone(), conn.clone());

        tokio::spawn(handle_connection(tab, socket, rx, state, open));

        conn
    }

    /// Queue a push for the page agent.
    pub async fn push(&self, message: DispatcherMessage) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::Disconnected);
        }

        self.tx
            .send(message)
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Handle a WebSocket connection until either side closes it.
async fn handle_connection(
    tab: TabId,
    socket: WebSocket,
    mut outbound_rx: mpsc::Receiver<DispatcherMessage>,
    state: Arc<WsChannelState>,
    open: Arc<AtomicBool>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!(tab = %tab, "WebSocket connection established");

    loop {
        tokio::select! {
            // Dispatcher -> page
            Some(message) = outbound_rx.recv() => {
                if let Err(e) = send_frame(&mut ws_tx, ServerFrame::Push { message }).await {
                    warn!(tab = %tab, "Failed to push to page agent: {}", e);
                    break;
                }
            }

            // Page -> dispatcher
            result = ws_rx.next() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        let Some(reply) = handle_text(&tab, text.as_str(), &state) else {
                            continue;
                        };
                        if let Err(e) = send_frame(&mut ws_tx, reply).await {
                            warn!(tab = %tab, "Failed to answer page agent: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(tab = %tab, "WebSocket connection closed");
                        break;
                    }
                    Some(Ok(_)) => {
                        debug!(tab = %tab, "Ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        error!(tab = %tab, "WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }

        if !open.load(Ordering::SeqCst) {
            debug!(tab = %tab, "Connection closed by server");
            break;
        }
    }

    open.store(false, Ordering::SeqCst);
    state.connections.remove(&tab);
    debug!(tab = %tab, "WebSocket connection removed");
}

/// Route one inbound text frame. Returns the frame to answer with, if any.
fn handle_text(tab: &TabId, text: &str, state: &WsChannelState) -> Option<ServerFrame> {
    let message: PageMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(tab = %tab, "Invalid page message: {}", e);
            return Some(ServerFrame::Error {
                error: format!("Invalid message: {}", e),
            });
        }
    };

    let Some(endpoint) = state.endpoint.get() else {
        return Some(ServerFrame::Error {
            error: "Dispatcher not ready".to_string(),
        });
    };

    endpoint
        .handle(tab, message)
        .map(|ack| ServerFrame::Ack { ack })
}

async fn send_frame<S>(ws_tx: &mut S, frame: ServerFrame) -> Result<(), ChannelError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = frame
        .to_json()
        .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
    ws_tx
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ChannelError::SendFailed(e.to_string()))
}
