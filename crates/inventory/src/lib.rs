//! Inventory store for the storefront.
//!
//! The store is the shared source of truth for product price and stock.
//! Reads that feed a stock decision and the writes that follow them go
//! through an [`InventoryTransaction`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod product;
pub mod store;

pub use common::ProductId;
pub use error::{InventoryError, Result};
pub use memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use product::Product;
pub use store::{InventoryStore, InventoryStoreExt, InventoryTransaction};
