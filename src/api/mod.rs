// HTTP and WebSocket APIs

pub mod pages;
pub mod websocket;

pub use pages::{create_page_router, landing_page};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Full application router: WebSocket endpoint, landing page and static files
pub fn create_app(state: Arc<WsAppState>, static_dir: impl AsRef<Path>) -> Router {
    create_ws_router(state)
        .merge(create_page_router(static_dir))
        .layer(CorsLayer::permissive())
}
