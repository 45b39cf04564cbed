//! HTTP server and routing.

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, ws::WebSocket, ws::WebSocketUpgrade},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use inline_protocols::TabId;

use crate::{WsChannelState, WsConnection};

/// Create the Axum router for the WebSocket channel.
pub fn create_router(state: Arc<WsChannelState>) -> Router {
    Router::new()
        // Page agent endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsChannelState>>) -> Response {
    if state.endpoint.get().is_none() {
        return (StatusCode::SERVICE_UNAVAILABLE, "dispatcher not ready").into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register a new page agent connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsChannelState>) {
    let tab = TabId::generate();
    debug!(tab = %tab, "New WebSocket connection");

    WsConnection::spawn(tab.clone(), socket, state.clone());

    if let Some(endpoint) = state.endpoint.get() {
        endpoint.tab_connected(&tab);
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<WsChannelState>>) -> impl IntoResponse {
    let status = if state.endpoint.get().is_some() {
        "ok"
    } else {
        "starting"
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "connections": state.connections.len(),
        })
        .to_string(),
    )
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
