//! Shopping cart for the storefront.
//!
//! This crate provides:
//! - [`Cart`], the per-session mapping from product to requested quantity
//! - [`CartSessions`], the explicit session-keyed registry that owns carts
//!
//! Carts live only as long as their session and never touch the inventory
//! store; stock is reconciled by the checkout coordinator.

pub mod cart;
pub mod session;

pub use cart::{Cart, CartLine};
pub use session::{CartSessions, SharedCart};
