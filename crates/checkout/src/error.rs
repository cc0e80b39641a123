//! Checkout error types.

use common::ProductId;
use inventory::InventoryError;
use thiserror::Error;

/// Errors that can occur during checkout.
///
/// Whatever the variant, no inventory change from the failed attempt is
/// visible and the cart is left as it was.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A line asks for more units than the store has on hand.
    #[error(
        "Not enough stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A line refers to a product the store no longer has.
    #[error("Product not found: {product_id} (requested {requested})")]
    ProductNotFound {
        product_id: ProductId,
        requested: u32,
    },

    /// The inventory store failed; the transaction was rolled back.
    #[error("Inventory store error: {0}")]
    Inventory(#[from] InventoryError),
}

impl CheckoutError {
    /// The product that blocked the checkout, if the failure was about stock.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            CheckoutError::InsufficientStock { product_id, .. }
            | CheckoutError::ProductNotFound { product_id, .. } => Some(product_id),
            CheckoutError::Inventory(_) => None,
        }
    }

    /// Units available for the offending product. A missing product has 0.
    pub fn available(&self) -> Option<u32> {
        match self {
            CheckoutError::InsufficientStock { available, .. } => Some(*available),
            CheckoutError::ProductNotFound { .. } => Some(0),
            CheckoutError::Inventory(_) => None,
        }
    }

    /// Units requested for the offending product.
    pub fn requested(&self) -> Option<u32> {
        match self {
            CheckoutError::InsufficientStock { requested, .. }
            | CheckoutError::ProductNotFound { requested, .. } => Some(*requested),
            CheckoutError::Inventory(_) => None,
        }
    }

    /// How many units short the offending line is.
    pub fn shortfall(&self) -> Option<u32> {
        Some(self.requested()?.saturating_sub(self.available()?))
    }

    /// True when the caller can fix the cart and retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CheckoutError::Inventory(_))
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
