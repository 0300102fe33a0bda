//! Domain entities for the storefront cart and checkout flow.
//!
//! This crate provides the line collections the cart store manages
//! (cart lines, saved-for-later lines, wishlist entries) and the value
//! objects accumulated during checkout (address, delivery option,
//! payment selection).

pub mod checkout;
pub mod line;
pub mod product;
pub mod wishlist;

pub use checkout::{Address, DeliveryOption, GeoPoint, PaymentMethod, PaymentSelection};
pub use line::{CartLine, SavedLine};
pub use product::ProductRef;
pub use wishlist::WishlistLine;
