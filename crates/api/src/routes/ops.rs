//! Health and metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use inventory::InventoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
}

/// GET /health — liveness plus the number of sessions holding a cart.
pub async fn health<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    let active_sessions = state.sessions.len().await;
    metrics::gauge!("cart_active_sessions").set(active_sessions as f64);
    Json(HealthResponse {
        status: "ok",
        active_sessions,
    })
}

/// GET /metrics — Prometheus text exposition.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
