//! Checkout selection value objects.

use common::Money;
use serde::{Deserialize, Serialize};

/// A shipping address, either persisted server-side (carries an `id`)
/// or entered inline during checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Server-assigned address ID, when the address is persisted.
    pub id: Option<i64>,

    /// Recipient name.
    pub recipient: String,

    /// Street address.
    pub line1: String,

    /// Additional address line.
    pub line2: Option<String>,

    /// City.
    pub city: String,

    /// State.
    pub state: String,

    /// Postal PIN code.
    pub pincode: String,

    /// Contact phone number.
    pub phone: Option<String>,
}

impl Address {
    /// Creates an inline (not yet persisted) address.
    pub fn inline(
        recipient: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pincode: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            recipient: recipient.into(),
            line1: line1.into(),
            line2: None,
            city: city.into(),
            state: state.into(),
            pincode: pincode.into(),
            phone: None,
        }
    }

    /// Marks the address as persisted under the given server ID.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// A delivery option offered at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOption {
    /// Option identifier understood by the backend ("standard", "express").
    pub id: String,

    /// Display label.
    pub label: String,

    /// Delivery charge.
    pub price: Money,
}

impl DeliveryOption {
    /// Creates a delivery option.
    pub fn new(id: impl Into<String>, label: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            price,
        }
    }
}

/// Payment methods the checkout accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,

    /// Card payment through the gateway.
    Card,

    /// UPI payment.
    Upi,

    /// Wallet payment.
    Wallet,
}

impl PaymentMethod {
    /// Returns true for cash on delivery.
    pub fn is_cod(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }

    /// Returns the wire name used by the checkout backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The payment step's output: chosen method plus method-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSelection {
    /// The chosen payment method.
    pub method: PaymentMethod,

    /// UPI virtual payment address, for UPI payments.
    pub upi_id: Option<String>,

    /// Masked card digits, for card payments.
    pub card_last4: Option<String>,

    /// Gateway payment reference, set when an external
    /// payment-confirmation callback already created the order.
    pub payment_ref: Option<String>,

    /// When true, the order was already created during payment
    /// verification and the review step is bypassed.
    pub skip_review: bool,
}

impl PaymentSelection {
    /// Creates a selection for the given method.
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            upi_id: None,
            card_last4: None,
            payment_ref: None,
            skip_review: false,
        }
    }

    /// Attaches a UPI virtual payment address.
    pub fn with_upi_id(mut self, upi_id: impl Into<String>) -> Self {
        self.upi_id = Some(upi_id.into());
        self
    }

    /// Attaches masked card digits.
    pub fn with_card_last4(mut self, last4: impl Into<String>) -> Self {
        self.card_last4 = Some(last4.into());
        self
    }

    /// Marks the order as already created by the payment gateway
    /// callback; the review step will be bypassed.
    pub fn with_confirmed_payment(mut self, payment_ref: impl Into<String>) -> Self {
        self.payment_ref = Some(payment_ref.into());
        self.skip_review = true;
        self
    }
}

/// A geographic position attached to order notifications when the
/// customer shared their location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,
}
