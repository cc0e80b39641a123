//! HTTP API server with observability for the storefront cart.
//!
//! Provides REST endpoints for cart manipulation and checkout, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use inventory::{InventoryError, InventoryStore, InventoryStoreExt, Product};
use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::{AppState, SESSION_HEADER, Session};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: InventoryStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health::<S>))
        .route(
            "/cart",
            get(routes::cart::show::<S>).delete(routes::cart::end_session::<S>),
        )
        .route(
            "/cart/products/{product_id}",
            post(routes::cart::add_product::<S>).delete(routes::cart::remove_product::<S>),
        )
        .route("/cart/checkout", post(routes::cart::checkout_cart::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around an inventory store.
pub fn create_default_state<S: InventoryStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}

/// Loads products from a JSON array into the store, replacing any with the
/// same id. Returns how many were written.
pub async fn seed_inventory<S: InventoryStore>(
    store: &S,
    json: &str,
) -> Result<usize, SeedError> {
    let products: Vec<Product> = serde_json::from_str(json)?;
    let count = products.len();
    store.save_all(products).await?;
    tracing::info!(count, "inventory seeded");
    Ok(count)
}

/// Errors from [`seed_inventory`].
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file is not a JSON array of products.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store rejected the seed products.
    #[error("Failed to write seed products: {0}")]
    Inventory(#[from] InventoryError),
}
