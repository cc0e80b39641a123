//! Checkout receipts.

use chrono::{DateTime, Utc};
use common::ProductId;
use rust_decimal::Decimal;

/// One purchased line, priced at the moment of checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price read from the store inside the checkout transaction.
    pub unit_price: Decimal,
    /// Stock left after this checkout.
    pub remaining_stock: u32,
}

impl ReceiptLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    lines: Vec<ReceiptLine>,
    total: Decimal,
    checked_out_at: DateTime<Utc>,
}

impl CheckoutReceipt {
    /// Builds a receipt, totalling the lines.
    pub fn new(lines: Vec<ReceiptLine>) -> Self {
        let total = lines
            .iter()
            .map(ReceiptLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Self {
            lines,
            total,
            checked_out_at: Utc::now(),
        }
    }

    /// Receipt for checking out an empty cart.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn checked_out_at(&self) -> DateTime<Utc> {
        self.checked_out_at
    }

    /// True when nothing was bought.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units bought.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
