//! HTTP route handlers and the state and extractors they share.

pub mod cart;
pub mod ops;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ::cart::CartSessions;
use checkout::CheckoutCoordinator;
use common::SessionId;
use inventory::InventoryStore;

use crate::error::ApiError;

/// Header carrying the caller's session key.
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared application state accessible from all handlers.
pub struct AppState<S: InventoryStore> {
    pub sessions: CartSessions,
    pub checkout: CheckoutCoordinator<S>,
}

impl<S: InventoryStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            sessions: CartSessions::new(),
            checkout: CheckoutCoordinator::new(store),
        }
    }

    /// The inventory store behind the checkout coordinator.
    pub fn store(&self) -> &S {
        self.checkout.store()
    }
}

/// The session a request belongs to, taken from the `x-session-id` header.
///
/// Issuing and authenticating session keys is the identity provider's job;
/// any well-formed UUID is accepted here.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub SessionId);

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing {SESSION_HEADER} header")))?;

        let value = value
            .to_str()
            .map_err(|e| ApiError::BadRequest(format!("Invalid {SESSION_HEADER} header: {e}")))?;

        value
            .parse::<SessionId>()
            .map(Session)
            .map_err(|e| ApiError::BadRequest(format!("Invalid session id: {e}")))
    }
}
