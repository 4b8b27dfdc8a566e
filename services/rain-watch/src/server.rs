//! HTTP publisher for the current snapshot.
//!
//! Provides endpoints for:
//! - The raining points of the latest snapshot (`/`)
//! - Snapshot metadata (`/status`)
//! - Liveness (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::SnapshotStore;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub bucket: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub raining: usize,
}

// ============================================================================
// Shared State
// ============================================================================

pub struct ServerState {
    pub snapshots: Arc<SnapshotStore>,
    /// Absent when no recorder was installed (tests)
    pub prometheus: Option<PrometheusHandle>,
}

// ============================================================================
// Router
// ============================================================================

/// Create the publisher router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(points_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

/// Serve `router` on `addr` until the shutdown channel fires.
pub async fn run_server(
    state: Arc<ServerState>,
    addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Publisher listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Raining points of the latest snapshot
async fn points_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let snapshot = state.snapshots.current().await;
    Json(snapshot.points.clone())
}

/// GET /status - Which bucket is being served
async fn status_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let snapshot = state.snapshots.current().await;
    Json(StatusResponse {
        service: "rain-watch",
        bucket: snapshot.bucket.clone(),
        published_at: snapshot.published_at,
        raining: snapshot.len(),
    })
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text format
async fn metrics_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
