//! Checkout for session carts.
//!
//! Checkout reconciles a cart with the inventory store in one transaction:
//! 1. Re-read every line's product and lock it
//! 2. Reject the whole checkout if any line is short or its product is gone
//! 3. Write all deductions in one batch and make them durable
//! 4. Clear the cart
//!
//! A failure at any step leaves both inventory and cart unchanged.

pub mod coordinator;
pub mod error;
pub mod receipt;

pub use coordinator::CheckoutCoordinator;
pub use error::CheckoutError;
pub use receipt::{CheckoutReceipt, ReceiptLine};
