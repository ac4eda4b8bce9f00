//! Read-only JSON status endpoint.
//!
//! ```text
//! GET /status          → every node, in config order
//! GET /status/{name}   → one node, 404 if unknown
//! ```

pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::health::NodeRegistry;
use crate::lifecycle::triggered;
use self::handlers::{get_node, list_nodes};

/// State shared with the status handlers.
#[derive(Clone)]
pub struct StatusState {
    pub registry: Arc<NodeRegistry>,
    /// Window reported as `recent_failures`.
    pub window_secs: u64,
}

pub fn status_router(state: StatusState) -> Router {
    Router::new()
        .route("/status", get(list_nodes))
        .route("/status/{name}", get(get_node))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    state: StatusState,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Status endpoint listening");
    }

    axum::serve(listener, status_router(state))
        .with_graceful_shutdown(async move {
            triggered(&mut shutdown).await;
            tracing::info!("Status endpoint shutting down");
        })
        .await
}
