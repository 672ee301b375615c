use crate::fleet::FleetStore;
use crate::subscription::{ConnectionRegistry, Session};
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state for WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub fleet: Arc<FleetStore>,
    pub registry: Arc<ConnectionRegistry>,
    /// Outbound frames buffered per connection
    pub channel_capacity: usize,
}

/// GET /ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    let session = Session::new(
        Arc::clone(&state.fleet),
        Arc::clone(&state.registry),
        state.channel_capacity,
    );

    session.handle(socket).await;
}
