//! Session-keyed cart registry.

use std::collections::HashMap;
use std::sync::Arc;

use common::SessionId;
use tokio::sync::{Mutex, RwLock};

use crate::Cart;

/// A cart shared between the requests of one session.
///
/// Hold the lock for the whole of an add, remove or checkout so that
/// concurrent requests from the same session cannot lose updates.
pub type SharedCart = Arc<Mutex<Cart>>;

/// Owns the cart of every live session.
///
/// Carts are created on first access and destroyed by [`end_session`].
/// Nothing here is persisted.
///
/// [`end_session`]: CartSessions::end_session
#[derive(Clone, Default)]
pub struct CartSessions {
    carts: Arc<RwLock<HashMap<SessionId, SharedCart>>>,
}

impl CartSessions {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's cart, creating an empty one on first use.
    pub async fn cart(&self, session: SessionId) -> SharedCart {
        if let Some(cart) = self.carts.read().await.get(&session) {
            return cart.clone();
        }

        let mut carts = self.carts.write().await;
        carts
            .entry(session)
            .or_insert_with(|| {
                tracing::debug!(%session, "cart created");
                Arc::new(Mutex::new(Cart::new()))
            })
            .clone()
    }

    /// Returns the session's cart if one exists.
    pub async fn get(&self, session: SessionId) -> Option<SharedCart> {
        self.carts.read().await.get(&session).cloned()
    }

    /// Destroys the session's cart. Returns true if there was one.
    pub async fn end_session(&self, session: SessionId) -> bool {
        let removed = self.carts.write().await.remove(&session).is_some();
        if removed {
            tracing::debug!(%session, "cart destroyed");
        }
        removed
    }

    pub async fn contains(&self, session: SessionId) -> bool {
        self.carts.read().await.contains_key(&session)
    }

    /// Number of live sessions with a cart.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}
