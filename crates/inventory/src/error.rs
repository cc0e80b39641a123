use rust_decimal::Decimal;
use thiserror::Error;

use crate::ProductId;

/// Errors that can occur when interacting with the inventory store.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A stored stock level cannot be represented as a quantity on hand.
    #[error("Invalid stock level for product {product_id}: {quantity}")]
    InvalidStock { product_id: ProductId, quantity: i64 },

    /// A unit price is negative or too large for the products table.
    #[error("Invalid unit price for product {product_id}: {unit_price}")]
    InvalidPrice {
        product_id: ProductId,
        unit_price: Decimal,
    },

    /// A batch of product writes was rejected before touching the store.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// The store could not make pending writes durable.
    #[error("Inventory store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for inventory store operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
