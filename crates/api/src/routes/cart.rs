//! Cart and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart::{Cart, CartLine};
use checkout::{CheckoutReceipt, ReceiptLine};
use common::{ProductId, SessionId};
use inventory::InventoryStore;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{AppState, Session};
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub session_id: String,
    pub lines: Vec<CartLineResponse>,
    pub item_count: u64,
    /// Total at the prices captured when products were added.
    pub total: Decimal,
    /// Total at current inventory prices.
    pub live_total: Decimal,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub lines: Vec<ReceiptLineResponse>,
    pub item_count: u64,
    pub total: Decimal,
    pub checked_out_at: String,
}

#[derive(Serialize)]
pub struct ReceiptLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub remaining_stock: u32,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id().to_string(),
            product_name: line.product().name.clone(),
            quantity: line.quantity(),
            unit_price: line.product().unit_price,
            line_total: line.line_total(),
        }
    }
}

impl From<&ReceiptLine> for ReceiptLineResponse {
    fn from(line: &ReceiptLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            remaining_stock: line.remaining_stock,
        }
    }
}

impl From<&CheckoutReceipt> for ReceiptResponse {
    fn from(receipt: &CheckoutReceipt) -> Self {
        Self {
            lines: receipt.lines().iter().map(ReceiptLineResponse::from).collect(),
            item_count: receipt.item_count(),
            total: receipt.total(),
            checked_out_at: receipt.checked_out_at().to_rfc3339(),
        }
    }
}

async fn cart_response<S: InventoryStore>(
    state: &AppState<S>,
    session: SessionId,
    cart: &Cart,
) -> Result<CartResponse, ApiError> {
    let live_total = state.checkout.live_total(cart).await?;
    Ok(CartResponse {
        session_id: session.to_string(),
        lines: cart
            .lines_by_product()
            .into_iter()
            .map(CartLineResponse::from)
            .collect(),
        item_count: cart.item_count(),
        total: cart.total(),
        live_total,
    })
}

// -- Handlers --

/// GET /cart — the session's cart, created empty on first access.
#[tracing::instrument(skip(state))]
pub async fn show<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Session(session): Session,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.sessions.cart(session).await;
    let cart = cart.lock().await;
    Ok(Json(cart_response(&state, session, &cart).await?))
}

/// POST /cart/products/:product_id — add one unit of a product.
#[tracing::instrument(skip(state))]
pub async fn add_product<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Session(session): Session,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = ProductId::new(product_id);
    let product = state
        .store()
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    let cart = state.sessions.cart(session).await;
    let mut cart = cart.lock().await;
    cart.add_product(product);
    metrics::counter!("cart_products_added").increment(1);

    Ok(Json(cart_response(&state, session, &cart).await?))
}

/// DELETE /cart/products/:product_id — remove one unit of a product.
///
/// Removing a product that is not in the cart is not an error.
#[tracing::instrument(skip(state))]
pub async fn remove_product<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Session(session): Session,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = ProductId::new(product_id);

    let cart = state.sessions.cart(session).await;
    let mut cart = cart.lock().await;
    cart.remove_product(&product_id);
    metrics::counter!("cart_products_removed").increment(1);

    Ok(Json(cart_response(&state, session, &cart).await?))
}

/// POST /cart/checkout — commit the cart against inventory.
#[tracing::instrument(skip(state))]
pub async fn checkout_cart<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Session(session): Session,
) -> Result<Json<ReceiptResponse>, ApiError> {
    let receipt = state
        .checkout
        .checkout_session(&state.sessions, session)
        .await?;
    Ok(Json(ReceiptResponse::from(&receipt)))
}

/// DELETE /cart — end the session and discard its cart.
#[tracing::instrument(skip(state))]
pub async fn end_session<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Session(session): Session,
) -> StatusCode {
    state.sessions.end_session(session).await;
    StatusCode::NO_CONTENT
}
