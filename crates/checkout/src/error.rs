//! Checkout error types.

use thiserror::Error;

use crate::step::CheckoutStep;

/// Errors that can occur while driving the checkout flow.
///
/// Step-transition failures block progression; the flow stays on its
/// current step so the caller can retry or go back.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No authenticated identity.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("Your cart is empty. Please add items before placing an order.")]
    EmptyCart,

    /// Persisting or loading a step's data failed; the flow stays on
    /// the step.
    #[error("Checkout step {step} failed: {reason}")]
    StepFailed { step: CheckoutStep, reason: String },

    /// The requested transition is not legal from the current step.
    #[error("Invalid checkout transition: {0}")]
    InvalidTransition(String),

    /// The order placement call failed; no order is assumed created.
    #[error("Order placement failed: {0}")]
    PlacementFailed(String),

    /// Remote checkout service error.
    #[error("Checkout service error: {0}")]
    CheckoutService(String),

    /// Notification dispatch error.
    #[error("Notification service error: {0}")]
    Notification(String),

    /// HTTP transport error.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cart store failure while clearing after placement.
    #[error("Cart error: {0}")]
    Cart(#[from] cart::CartError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
