//! Checkout step state machine.

use serde::{Deserialize, Serialize};

/// The step a checkout session is on.
///
/// Step transitions:
/// ```text
/// AddressSelection ──► DeliveryAndPayment ──► PaymentMethod ──► OrderReview ──► Completion
///        ▲                    ▲ │                  ▲ │ │            │ ▲
///        └────────────────────┴─┴──────────────────┴─┘ └────────────┘ │ (backward moves free)
///                                                      └──────────────┴──► Completion (skip-review edge)
/// ```
///
/// Forward movement requires the current step's data to be persisted
/// server-side; backward movement among steps 1–4 is free. The
/// skip-review edge goes straight from `PaymentMethod` to `Completion`
/// when the order was already created by a payment-confirmation
/// callback. `Completion` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    /// Selecting or creating a delivery address.
    #[default]
    AddressSelection,

    /// Choosing a delivery option (and preliminary payment method).
    DeliveryAndPayment,

    /// Choosing the payment method and entering method data.
    PaymentMethod,

    /// Reviewing the server-computed order snapshot.
    OrderReview,

    /// Order placed; the session navigates away from here (terminal).
    Completion,
}

impl CheckoutStep {
    /// Returns the 1-based ordinal of this step.
    pub fn ordinal(&self) -> u8 {
        match self {
            CheckoutStep::AddressSelection => 1,
            CheckoutStep::DeliveryAndPayment => 2,
            CheckoutStep::PaymentMethod => 3,
            CheckoutStep::OrderReview => 4,
            CheckoutStep::Completion => 5,
        }
    }

    /// Returns true if this is the terminal step.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Completion)
    }

    /// Returns true if the session may move backward to `target`.
    pub fn can_go_back_to(&self, target: CheckoutStep) -> bool {
        !self.is_terminal() && target.ordinal() < self.ordinal()
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::AddressSelection => "AddressSelection",
            CheckoutStep::DeliveryAndPayment => "DeliveryAndPayment",
            CheckoutStep::PaymentMethod => "PaymentMethod",
            CheckoutStep::OrderReview => "OrderReview",
            CheckoutStep::Completion => "Completion",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
