//! Transient user notifications.
//!
//! The store queues a notice for every user-visible outcome; the UI
//! drains the queue and renders each as an auto-dismissing toast.

use serde::{Deserialize, Serialize};

/// Visual level of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    /// Green toast.
    Success,

    /// Red toast.
    Error,
}

/// A transient, auto-dismissing user notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// A product was added to the cart.
    AddedToCart { name: String },

    /// An existing cart line's quantity was raised.
    CartQuantityUpdated { name: String },

    /// The product has no stock at all.
    OutOfStock,

    /// The requested quantity was clamped to available stock.
    StockLimitExceeded,

    /// The authenticated add-to-cart call failed; nothing changed.
    CartAddFailed { reason: String },

    /// A product was added to the wishlist.
    AddedToWishlist { name: String },

    /// The product is already on the wishlist; nothing changed.
    AlreadyInWishlist { name: String },

    /// A product was removed from the wishlist.
    RemovedFromWishlist { name: String },

    /// The authenticated wishlist add failed; nothing changed.
    WishlistAddFailed { reason: String },

    /// The wishlist removal failed remotely; the local entry was
    /// still removed.
    WishlistRemoveFailed { reason: String },
}

impl Notice {
    /// Returns the visual level for this notice.
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::AddedToCart { .. }
            | Notice::CartQuantityUpdated { .. }
            | Notice::AddedToWishlist { .. }
            | Notice::RemovedFromWishlist { .. } => NoticeLevel::Success,
            Notice::OutOfStock
            | Notice::StockLimitExceeded
            | Notice::CartAddFailed { .. }
            | Notice::AlreadyInWishlist { .. }
            | Notice::WishlistAddFailed { .. }
            | Notice::WishlistRemoveFailed { .. } => NoticeLevel::Error,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::AddedToCart { name } => write!(f, "{name} added to cart!"),
            Notice::CartQuantityUpdated { name } => write!(f, "Updated {name} quantity in cart!"),
            Notice::OutOfStock => write!(f, "This product is out of stock"),
            Notice::StockLimitExceeded => write!(f, "Stock limit exceeded"),
            Notice::CartAddFailed { reason } => write!(f, "{reason}"),
            Notice::AddedToWishlist { name } => write!(f, "{name} added to wishlist!"),
            Notice::AlreadyInWishlist { name } => write!(f, "{name} is already in wishlist!"),
            Notice::RemovedFromWishlist { name } => write!(f, "{name} removed from wishlist!"),
            Notice::WishlistAddFailed { reason } => write!(f, "{reason}"),
            Notice::WishlistRemoveFailed { reason } => write!(f, "{reason}"),
        }
    }
}
