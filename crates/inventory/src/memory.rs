use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    InventoryError, Product, ProductId, Result,
    store::{InventoryStore, InventoryTransaction, validate_products_for_save},
};

type ProductTable = HashMap<ProductId, Product>;

/// In-memory inventory store.
///
/// A transaction holds the table lock from [`InventoryStore::begin`] until it
/// is flushed or dropped, so validate-then-deduct sequences from different
/// sessions never interleave. Only suitable for a single process.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    products: Arc<Mutex<ProductTable>>,
    fail_on_flush: Arc<AtomicBool>,
    flushes: Arc<AtomicUsize>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let table = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        Self {
            products: Arc::new(Mutex::new(table)),
            ..Self::default()
        }
    }

    /// Configures every subsequent flush to fail, as if the backing storage
    /// had become unavailable.
    pub fn set_fail_on_flush(&self, fail: bool) {
        self.fail_on_flush.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of transactions that were flushed successfully.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Returns the number of products stored.
    pub async fn product_count(&self) -> usize {
        self.products.lock().await.len()
    }

    /// Removes a product, as when it is delisted.
    pub async fn remove(&self, id: &ProductId) -> Option<Product> {
        self.products.lock().await.remove(id)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.lock().await.get(id).cloned())
    }

    async fn save(&self, product: Product) -> Result<()> {
        validate_products_for_save(std::slice::from_ref(&product))?;
        self.products
            .lock()
            .await
            .insert(product.id.clone(), product);
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn InventoryTransaction>> {
        let table = self.products.clone().lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            table,
            staged: HashMap::new(),
            fail_on_flush: self.fail_on_flush.clone(),
            flushes: self.flushes.clone(),
        }))
    }
}

/// Transaction over [`InMemoryInventoryStore`].
///
/// Writes are kept in `staged` and only copied into the table on flush.
pub struct InMemoryTransaction {
    table: OwnedMutexGuard<ProductTable>,
    staged: HashMap<ProductId, Product>,
    fail_on_flush: Arc<AtomicBool>,
    flushes: Arc<AtomicUsize>,
}

#[async_trait]
impl InventoryTransaction for InMemoryTransaction {
    async fn find_by_id(&mut self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self
            .staged
            .get(id)
            .or_else(|| self.table.get(id))
            .cloned())
    }

    async fn save_all(&mut self, products: Vec<Product>) -> Result<()> {
        validate_products_for_save(&products)?;
        for product in products {
            self.staged.insert(product.id.clone(), product);
        }
        Ok(())
    }

    async fn flush(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            mut table,
            staged,
            fail_on_flush,
            flushes,
        } = *self;

        if fail_on_flush.load(Ordering::SeqCst) {
            tracing::warn!(staged = staged.len(), "flush failed, discarding staged writes");
            return Err(InventoryError::Unavailable(
                "in-memory store is configured to fail on flush".to_string(),
            ));
        }

        let written = staged.len();
        table.extend(staged);
        flushes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(written, "inventory transaction flushed");
        Ok(())
    }
}
