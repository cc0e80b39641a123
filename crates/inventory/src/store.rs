use std::collections::HashSet;

use async_trait::async_trait;

use crate::{InventoryError, Product, ProductId, Result};

/// Core trait for inventory store implementations.
///
/// The store is shared by every session and every server process, so any
/// read-validate-write sequence must go through [`InventoryStore::begin`].
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Looks up a product outside of any transaction.
    ///
    /// Returns None if the product doesn't exist.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Inserts or replaces a single product.
    async fn save(&self, product: Product) -> Result<()>;

    /// Opens a transaction.
    ///
    /// Products read through the transaction stay locked against other
    /// transactions until it is flushed or dropped. Dropping a transaction
    /// without flushing it discards every staged write.
    async fn begin(&self) -> Result<Box<dyn InventoryTransaction>>;
}

/// A unit of work against the inventory store.
#[async_trait]
pub trait InventoryTransaction: Send {
    /// Reads the current state of a product and locks it for this
    /// transaction. Writes staged earlier in the transaction are visible.
    async fn find_by_id(&mut self, id: &ProductId) -> Result<Option<Product>>;

    /// Stages a batch of product writes.
    ///
    /// Nothing becomes visible to other transactions until [`flush`].
    ///
    /// [`flush`]: InventoryTransaction::flush
    async fn save_all(&mut self, products: Vec<Product>) -> Result<()>;

    /// Makes every staged write durable and ends the transaction.
    ///
    /// On error nothing staged in this transaction is applied.
    async fn flush(self: Box<Self>) -> Result<()>;
}

/// Extension trait providing convenience methods for inventory stores.
#[async_trait]
pub trait InventoryStoreExt: InventoryStore {
    /// Writes a batch of products atomically in its own transaction.
    async fn save_all(&self, products: Vec<Product>) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.save_all(products).await?;
        tx.flush().await
    }

    /// Checks if a product exists.
    async fn exists(&self, id: &ProductId) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

// Blanket implementation for all InventoryStore implementations
impl<T: InventoryStore + ?Sized> InventoryStoreExt for T {}

/// Validates a batch of products before staging it.
///
/// A batch may not name the same product twice, and every price must fit
/// the products table.
pub fn validate_products_for_save(products: &[Product]) -> Result<()> {
    let mut seen = HashSet::with_capacity(products.len());
    for product in products {
        if !product.has_valid_price() {
            return Err(InventoryError::InvalidPrice {
                product_id: product.id.clone(),
                unit_price: product.unit_price,
            });
        }
        if !seen.insert(&product.id) {
            return Err(InventoryError::InvalidBatch(format!(
                "product {} appears more than once",
                product.id
            )));
        }
    }
    Ok(())
}
