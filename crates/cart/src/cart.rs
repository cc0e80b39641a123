//! The cart aggregate.

use std::collections::HashMap;

use common::ProductId;
use inventory::Product;
use rust_decimal::Decimal;

/// One product in a cart and how many units of it were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product snapshot taken when the product was first added.
    ///
    /// Its price and stock are not refreshed while the line sits in the cart.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// The product identifier.
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Units requested. Always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Snapshot unit price times quantity, saturating at [`Decimal::MAX`].
    pub fn line_total(&self) -> Decimal {
        self.product
            .unit_price
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// A shopping cart for one session.
///
/// Holds at most one line per product. Add and remove never fail; stock is
/// only checked at checkout.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: HashMap<ProductId, CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product`.
    ///
    /// A product already in the cart keeps its original snapshot and gets
    /// its quantity bumped.
    pub fn add_product(&mut self, product: Product) {
        self.lines
            .entry(product.id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(1))
            .or_insert(CartLine {
                product,
                quantity: 1,
            });
    }

    /// Removes one unit of the product, dropping the line when it reaches
    /// zero. Does nothing if the product is not in the cart.
    pub fn remove_product(&mut self, product_id: &ProductId) {
        if let Some(line) = self.lines.get_mut(product_id) {
            if line.quantity > 1 {
                line.quantity -= 1;
            } else {
                self.lines.remove(product_id);
            }
        }
    }

    /// Returns the lines currently in the cart, in no particular order.
    pub fn products_in_cart(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Returns the lines ordered by product id.
    ///
    /// Checkout locks inventory rows in this order so that overlapping
    /// checkouts always acquire locks in the same sequence.
    pub fn lines_by_product(&self) -> Vec<&CartLine> {
        let mut lines: Vec<_> = self.lines.values().collect();
        lines.sort_by(|a, b| a.product_id().cmp(b.product_id()));
        lines
    }

    /// Gets the line for a product.
    pub fn get_line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Units of the product in the cart, 0 if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.lines.get(product_id).map_or(0, CartLine::quantity)
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of snapshot price times quantity over all lines.
    ///
    /// Prices come from the snapshots captured at add time and may be stale;
    /// use the checkout coordinator's live total for current prices.
    pub fn total(&self) -> Decimal {
        self.lines
            .values()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
