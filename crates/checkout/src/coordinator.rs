//! Checkout coordinator.

use cart::{Cart, CartSessions};
use common::SessionId;
use inventory::InventoryStore;
use rust_decimal::Decimal;

use crate::error::{CheckoutError, Result};
use crate::receipt::{CheckoutReceipt, ReceiptLine};

/// Commits session carts against the inventory store.
///
/// A checkout either deducts every line from stock and empties the cart, or
/// changes nothing at all.
pub struct CheckoutCoordinator<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> CheckoutCoordinator<S> {
    /// Creates a new checkout coordinator.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the inventory store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks out `cart`.
    ///
    /// Every line is re-read from the store inside one transaction. If any
    /// line is short or its product is gone the transaction is dropped, so
    /// no deduction becomes visible and the cart keeps its lines. The cart
    /// is only cleared once the store has made the deductions durable.
    ///
    /// Checking out an empty cart succeeds without touching the store.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.line_count()))]
    pub async fn checkout(&self, cart: &mut Cart) -> Result<CheckoutReceipt> {
        if cart.is_empty() {
            tracing::debug!("empty cart, nothing to check out");
            return Ok(CheckoutReceipt::empty());
        }

        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let result = self.commit(cart).await;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => {
                cart.clear();
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    items = receipt.item_count(),
                    total = %receipt.total(),
                    "checkout completed"
                );
            }
            Err(e) if e.is_recoverable() => {
                metrics::counter!("checkout_rejected").increment(1);
                tracing::info!(
                    product_id = ?e.product_id(),
                    shortfall = ?e.shortfall(),
                    "checkout rejected"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_failed").increment(1);
                tracing::error!(error = %e, "checkout failed");
            }
        }

        result
    }

    /// Locks the session's cart and checks it out.
    pub async fn checkout_session(
        &self,
        sessions: &CartSessions,
        session: SessionId,
    ) -> Result<CheckoutReceipt> {
        let cart = sessions.cart(session).await;
        let mut cart = cart.lock().await;
        self.checkout(&mut cart).await
    }

    /// Sums the cart at the prices currently in the store.
    ///
    /// Unlike [`Cart::total`] this reads every product, so price changes
    /// since the product was added are reflected. Products that no longer
    /// exist contribute nothing.
    ///
    /// This is a plain read, so a store failure surfaces as the
    /// [`InventoryError`](inventory::InventoryError) itself.
    pub async fn live_total(&self, cart: &Cart) -> inventory::Result<Decimal> {
        let mut total = Decimal::ZERO;
        for line in cart.products_in_cart() {
            if let Some(product) = self.store.find_by_id(line.product_id()).await? {
                let line_total = product
                    .unit_price
                    .saturating_mul(Decimal::from(line.quantity()));
                total = total.saturating_add(line_total);
            }
        }
        Ok(total)
    }

    /// Validates every line and writes the deductions in one batch.
    ///
    /// Deductions are collected in `pending` and only handed to the store
    /// after the last line has passed; returning early drops `tx`, which
    /// discards anything the transaction holds.
    async fn commit(&self, cart: &Cart) -> Result<CheckoutReceipt> {
        let mut tx = self.store.begin().await?;
        let mut pending = Vec::with_capacity(cart.line_count());
        let mut lines = Vec::with_capacity(cart.line_count());

        for line in cart.lines_by_product() {
            let requested = line.quantity();
            let current = tx.find_by_id(line.product_id()).await?.ok_or_else(|| {
                CheckoutError::ProductNotFound {
                    product_id: line.product_id().clone(),
                    requested,
                }
            })?;

            let remaining =
                current
                    .remaining_after(requested)
                    .ok_or_else(|| CheckoutError::InsufficientStock {
                        product_id: current.id.clone(),
                        requested,
                        available: current.quantity,
                    })?;

            lines.push(ReceiptLine {
                product_id: current.id.clone(),
                product_name: current.name.clone(),
                quantity: requested,
                unit_price: current.unit_price,
                remaining_stock: remaining,
            });
            pending.push(current.with_quantity(remaining));
        }

        tx.save_all(pending).await?;
        tx.flush().await?;

        Ok(CheckoutReceipt::new(lines))
    }
}
