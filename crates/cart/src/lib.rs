//! Client cart state for the storefront.
//!
//! The [`CartStore`] maintains the cart, saved-for-later and wishlist
//! collections, synchronizing with the remote cart and wishlist
//! services for authenticated customers and falling back to the local
//! persistent store for anonymous sessions.

pub mod error;
pub mod notice;
pub mod services;
pub mod store;

pub use error::CartError;
pub use notice::{Notice, NoticeLevel};
pub use services::{
    AddItemRequest, ApiConfig, HttpCartService, HttpWishlistService, InMemoryCartService,
    InMemoryWishlistService, RemoteCartAdd, RemoteCartLine, RemoteCartService, RemoteWishlistLine,
    WishlistService,
};
pub use store::{CartStore, SyncOutcome};
