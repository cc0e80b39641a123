//! Identifiers shared across the storefront crates.

mod types;

pub use types::{ProductId, SessionId};
