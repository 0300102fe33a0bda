//! Shared value types for the storefront cart and checkout flow.
//!
//! Identifiers are newtypes around their wire representation so the
//! compiler keeps product IDs, variant IDs, cart line IDs and order IDs
//! apart. Money is fixed-point paise.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerEmail, LineId, OrderId, ProductId, VariantId};
