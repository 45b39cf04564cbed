//! # Inline Channel - WebSocket
//!
//! WebSocket transport between page agents running in a browser and the
//! dispatcher.
//!
//! This channel:
//! - Accepts WebSocket connections on `/ws`, one tab per connection
//! - Hands every inbound page message to the [`DispatchEndpoint`] and writes
//!   the acknowledgement back on the same socket
//! - Implements [`TabOutbox`] so dispatcher pushes reach the right socket
//!
//! ## Usage
//!
//! ```ignore
//! use inline_channel_ws::{WsChannel, WsChannelConfig};
//!
//! let channel = Arc::new(WsChannel::new(WsChannelConfig::default()));
//! let dispatcher = Dispatcher::new(providers, channel.clone(), timeout);
//! channel.start(Arc::new(dispatcher)).await?;
//! ```

mod connection;
mod frame;
mod server;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info};

use inline_protocols::{ChannelError, DispatchEndpoint, DispatcherMessage, TabId, TabOutbox};

pub use connection::WsConnection;
pub use frame::ServerFrame;
pub use server::create_router;

/// WebSocket channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsChannelConfig {
    /// Host to bind to (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (default: 8787). Port 0 picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for WsChannelConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// State shared across handlers.
pub struct WsChannelState {
    /// Active connections keyed by the tab id they were assigned.
    pub connections: DashMap<TabId, WsConnection>,
    /// Set once when the channel starts.
    pub endpoint: OnceLock<Arc<dyn DispatchEndpoint>>,
}

impl WsChannelState {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            endpoint: OnceLock::new(),
        }
    }
}

impl Default for WsChannelState {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket channel for remote page agents.
pub struct WsChannel {
    config: WsChannelConfig,
    state: Arc<WsChannelState>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl WsChannel {
    pub fn new(config: WsChannelConfig) -> Self {
        Self {
            config,
            state: Arc::new(WsChannelState::new()),
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Get the channel's configured listen address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn state(&self) -> Arc<WsChannelState> {
        self.state.clone()
    }

    pub fn is_started(&self) -> bool {
        self.state.endpoint.get().is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.state.connections.len()
    }

    /// Bind and serve, routing inbound messages to `endpoint`.
    ///
    /// Returns the bound address. A channel can be started once.
    pub async fn start(
        &self,
        endpoint: Arc<dyn DispatchEndpoint>,
    ) -> Result<SocketAddr, ChannelError> {
        let addr = self.address();
        let listener_addr: SocketAddr = addr
            .parse()
            .map_err(|e| ChannelError::ConnectionFailed(format!("Invalid address: {}", e)))?;

        if self.is_started() {
            return Err(ChannelError::ConnectionFailed(
                "Channel already started".to_string(),
            ));
        }

        let listener = tokio::net::TcpListener::bind(listener_addr)
            .await
            .map_err(|e| ChannelError::ConnectionFailed(format!("Failed to bind: {}", e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;

        if self.state.endpoint.set(endpoint).is_err() {
            return Err(ChannelError::ConnectionFailed(
                "Channel already started".to_string(),
            ));
        }

        let router = create_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        if let Ok(mut slot) = self.shutdown_tx.lock() {
            *slot = Some(shutdown_tx);
        }

        info!("WebSocket channel listening at ws://{}/ws", local_addr);

        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("WebSocket server error: {}", e);
            }
        });

        Ok(local_addr)
    }

    /// Stop accepting connections and close the open ones.
    pub fn stop(&self) {
        let sender = self.shutdown_tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(sender) = sender {
            let _ = sender.send(());
        }

        for entry in self.state.connections.iter() {
            entry.value().close();
        }
        self.state.connections.clear();

        debug!("WebSocket channel stopped");
    }
}

#[async_trait]
impl TabOutbox for WsChannel {
    async fn push(&self, tab: &TabId, message: DispatcherMessage) -> Result<(), ChannelError> {
        let conn = self
            .state
            .connections
            .get(tab)
            .map(|c| c.clone())
            .ok_or_else(|| ChannelError::NotFound(tab.to_string()))?;

        conn.push(message).await
    }

    fn tabs(&self) -> Vec<TabId> {
        self.state
            .connections
            .iter()
            .filter(|e| e.value().is_open())
            .map(|e| e.key().clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
