use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A product as recorded by the inventory store.
///
/// Snapshots are values: a copy held elsewhere (for example in a cart line)
/// does not follow later price or stock changes in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Price per unit.
    pub unit_price: Decimal,

    /// Units on hand.
    pub quantity: u32,
}

impl Product {
    /// Largest unit price the store accepts, the top of `NUMERIC(19, 4)`.
    pub const MAX_UNIT_PRICE: Decimal =
        Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, 4);

    /// Creates a new product snapshot.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// True when the price is non-negative and within [`Product::MAX_UNIT_PRICE`].
    pub fn has_valid_price(&self) -> bool {
        self.unit_price >= Decimal::ZERO && self.unit_price <= Self::MAX_UNIT_PRICE
    }

    /// Returns a copy of this snapshot with a different stock level.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Returns the stock left after taking `requested` units, or `None` if
    /// there are not enough on hand.
    pub fn remaining_after(&self, requested: u32) -> Option<u32> {
        self.quantity.checked_sub(requested)
    }
}
