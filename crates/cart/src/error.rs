//! Cart error types.

use thiserror::Error;

/// Errors that can occur during cart store operations.
///
/// Only the primary state-changing remote call surfaces here (add to
/// cart / add to wishlist on the authenticated path). Best-effort
/// reconciliation failures are reported through
/// [`SyncOutcome`](crate::SyncOutcome) instead of an error.
#[derive(Debug, Error)]
pub enum CartError {
    /// Remote cart service error.
    #[error("Cart service error: {0}")]
    CartService(String),

    /// Remote wishlist service error.
    #[error("Wishlist service error: {0}")]
    WishlistService(String),

    /// HTTP transport error.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
