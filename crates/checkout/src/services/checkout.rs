//! Checkout service trait, in-memory fake, and HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerEmail, Money, OrderId};
use domain::{Address, PaymentMethod};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::pricing::Totals;

use super::ApiConfig;

/// Partial checkout selection persisted at each step transition.
///
/// Only the fields the step produced are set; the backend merges them
/// into the customer's checkout selection row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionUpdate {
    /// Selected persisted address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,

    /// Chosen delivery option id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_option: Option<String>,

    /// Chosen payment method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// Server-computed order review snapshot: the authoritative address
/// and pricing summary shown before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSnapshot {
    /// Shipping address on record.
    pub address: Option<Address>,

    /// Authoritative pricing breakdown.
    pub totals: Totals,
}

/// The order record reference returned by placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// Server-assigned order identifier.
    pub order_id: OrderId,

    /// Order total, when the backend returns it.
    pub total: Option<Money>,
}

/// Trait for the remote checkout service.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Persists a partial checkout selection for the identity.
    async fn save_selection(
        &self,
        identity: &CustomerEmail,
        update: &SelectionUpdate,
    ) -> Result<(), CheckoutError>;

    /// Fetches the server-computed order review snapshot.
    async fn review(&self, identity: &CustomerEmail) -> Result<ReviewSnapshot, CheckoutError>;

    /// Places the order for the identity.
    ///
    /// The backend owns the priced line items; the client transmits
    /// identity only.
    async fn place_order(&self, identity: &CustomerEmail) -> Result<PlacedOrder, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryCheckoutState {
    selections: Vec<(CustomerEmail, SelectionUpdate)>,
    reviews: HashMap<CustomerEmail, ReviewSnapshot>,
    next_order: u32,
    placed: Vec<(CustomerEmail, OrderId)>,
    review_calls: u32,
    place_calls: u32,
    fail_on_save: bool,
    fail_on_review: bool,
    fail_on_place: bool,
}

/// In-memory checkout service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckoutService {
    state: Arc<RwLock<InMemoryCheckoutState>>,
}

impl InMemoryCheckoutService {
    /// Creates a new in-memory checkout service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the review snapshot returned for an identity.
    pub fn seed_review(&self, identity: &CustomerEmail, snapshot: ReviewSnapshot) {
        self.state
            .write()
            .unwrap()
            .reviews
            .insert(identity.clone(), snapshot);
    }

    /// Configures the service to fail on save-selection calls.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state.write().unwrap().fail_on_save = fail;
    }

    /// Configures the service to fail on review calls.
    pub fn set_fail_on_review(&self, fail: bool) {
        self.state.write().unwrap().fail_on_review = fail;
    }

    /// Configures the service to fail on place-order calls.
    pub fn set_fail_on_place(&self, fail: bool) {
        self.state.write().unwrap().fail_on_place = fail;
    }

    /// Returns the selections saved so far, in order.
    pub fn saved_selections(&self) -> Vec<SelectionUpdate> {
        self.state
            .read()
            .unwrap()
            .selections
            .iter()
            .map(|(_, update)| update.clone())
            .collect()
    }

    /// Returns the number of review calls received.
    pub fn review_call_count(&self) -> u32 {
        self.state.read().unwrap().review_calls
    }

    /// Returns the number of place-order calls received.
    pub fn place_call_count(&self) -> u32 {
        self.state.read().unwrap().place_calls
    }

    /// Returns the number of orders placed.
    pub fn placed_order_count(&self) -> usize {
        self.state.read().unwrap().placed.len()
    }
}

#[async_trait]
impl CheckoutService for InMemoryCheckoutService {
    async fn save_selection(
        &self,
        identity: &CustomerEmail,
        update: &SelectionUpdate,
    ) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_save {
            return Err(CheckoutError::CheckoutService(
                "selection save failed".to_string(),
            ));
        }

        state.selections.push((identity.clone(), update.clone()));
        Ok(())
    }

    async fn review(&self, identity: &CustomerEmail) -> Result<ReviewSnapshot, CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.review_calls += 1;

        if state.fail_on_review {
            return Err(CheckoutError::CheckoutService(
                "review unavailable".to_string(),
            ));
        }

        Ok(state
            .reviews
            .get(identity)
            .cloned()
            .unwrap_or(ReviewSnapshot {
                address: None,
                totals: Totals::zero(),
            }))
    }

    async fn place_order(&self, identity: &CustomerEmail) -> Result<PlacedOrder, CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.place_calls += 1;

        if state.fail_on_place {
            return Err(CheckoutError::CheckoutService(
                "order placement rejected".to_string(),
            ));
        }

        state.next_order += 1;
        let order_id = OrderId::new(format!("ORD-{:04}", state.next_order));
        state.placed.push((identity.clone(), order_id.clone()));

        Ok(PlacedOrder {
            order_id,
            total: None,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressWire {
    id: Option<i64>,
    #[serde(default)]
    recipient: String,
    #[serde(default)]
    line1: String,
    line2: Option<String>,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    pincode: String,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewWire {
    address: Option<AddressWire>,
    #[serde(default)]
    subtotal: f64,
    #[serde(default)]
    shipping: f64,
    #[serde(default)]
    discount: f64,
    #[serde(default)]
    total: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacedOrderWire {
    id: serde_json::Value,
    total: Option<f64>,
}

/// HTTP client for the checkout endpoints of the storefront API.
#[derive(Debug, Clone)]
pub struct HttpCheckoutService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCheckoutService {
    /// Creates a client against the configured API origin.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl CheckoutService for HttpCheckoutService {
    async fn save_selection(
        &self,
        identity: &CustomerEmail,
        update: &SelectionUpdate,
    ) -> Result<(), CheckoutError> {
        let response = self
            .client
            .post(format!("{}/api/checkout/selection", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckoutError::CheckoutService(format!(
                "selection save failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn review(&self, identity: &CustomerEmail) -> Result<ReviewSnapshot, CheckoutError> {
        let response = self
            .client
            .get(format!("{}/api/checkout/review", self.base_url))
            .query(&[("email", identity.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckoutError::CheckoutService(format!(
                "review fetch failed: HTTP {}",
                response.status()
            )));
        }

        let wire: ReviewWire = response.json().await?;
        Ok(ReviewSnapshot {
            address: wire.address.map(|a| Address {
                id: a.id,
                recipient: a.recipient,
                line1: a.line1,
                line2: a.line2,
                city: a.city,
                state: a.state,
                pincode: a.pincode,
                phone: a.phone,
            }),
            totals: Totals {
                subtotal: Money::from_rupees_f64(wire.subtotal),
                shipping: Money::from_rupees_f64(wire.shipping),
                discount: Money::from_rupees_f64(wire.discount),
                total: Money::from_rupees_f64(wire.total),
            },
        })
    }

    async fn place_order(&self, identity: &CustomerEmail) -> Result<PlacedOrder, CheckoutError> {
        let response = self
            .client
            .post(format!("{}/api/checkout/place-order", self.base_url))
            .query(&[("email", identity.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckoutError::CheckoutService(format!(
                "order placement failed: HTTP {}",
                response.status()
            )));
        }

        let wire: PlacedOrderWire = response.json().await?;
        let order_id = match wire.id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(PlacedOrder {
            order_id: OrderId::new(order_id),
            total: wire.total.map(Money::from_rupees_f64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CustomerEmail {
        CustomerEmail::new("asha@example.com")
    }

    #[tokio::test]
    async fn test_selections_are_recorded_in_order() {
        let service = InMemoryCheckoutService::new();
        service
            .save_selection(
                &identity(),
                &SelectionUpdate {
                    address_id: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service
            .save_selection(
                &identity(),
                &SelectionUpdate {
                    delivery_option: Some("express".to_string()),
                    payment_method: Some(PaymentMethod::Upi),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let saved = service.saved_selections();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].address_id, Some(7));
        assert_eq!(saved[1].delivery_option.as_deref(), Some("express"));
    }

    #[tokio::test]
    async fn test_place_order_assigns_sequential_ids() {
        let service = InMemoryCheckoutService::new();
        let first = service.place_order(&identity()).await.unwrap();
        let second = service.place_order(&identity()).await.unwrap();

        assert_eq!(first.order_id.as_str(), "ORD-0001");
        assert_eq!(second.order_id.as_str(), "ORD-0002");
        assert_eq!(service.placed_order_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_place_leaves_no_order() {
        let service = InMemoryCheckoutService::new();
        service.set_fail_on_place(true);

        let result = service.place_order(&identity()).await;
        assert!(matches!(result, Err(CheckoutError::CheckoutService(_))));
        assert_eq!(service.placed_order_count(), 0);
        assert_eq!(service.place_call_count(), 1);
    }

    #[tokio::test]
    async fn test_review_defaults_to_empty_snapshot() {
        let service = InMemoryCheckoutService::new();
        let snapshot = service.review(&identity()).await.unwrap();
        assert!(snapshot.address.is_none());
        assert!(snapshot.totals.total.is_zero());
    }

    #[test]
    fn test_selection_update_skips_unset_fields() {
        let update = SelectionUpdate {
            address_id: Some(7),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"addressId":7}"#);
    }
}
