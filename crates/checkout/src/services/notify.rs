//! Post-placement notification dispatch.
//!
//! Cash-on-delivery orders get a confirmation email through the
//! backend; gateway-paid orders get a WhatsApp message with the order
//! summary and, when shared, the customer's location. Both dispatches
//! are best-effort at the call site.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerEmail, OrderId};
use domain::GeoPoint;

use crate::error::CheckoutError;

use super::ApiConfig;
use super::checkout::{PlacedOrder, ReviewSnapshot};

/// Trait for order notification dispatch.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends the order confirmation email for a COD order.
    async fn send_order_email(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        review: Option<&ReviewSnapshot>,
    ) -> Result<(), CheckoutError>;

    /// Sends the order summary over WhatsApp for a gateway-paid order.
    async fn send_order_whatsapp(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        review: Option<&ReviewSnapshot>,
        location: Option<&GeoPoint>,
    ) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    emails: Vec<(CustomerEmail, OrderId)>,
    whatsapp: Vec<(CustomerEmail, OrderId, Option<GeoPoint>)>,
    fail_on_email: bool,
    fail_on_whatsapp: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on email dispatch.
    pub fn set_fail_on_email(&self, fail: bool) {
        self.state.write().unwrap().fail_on_email = fail;
    }

    /// Configures the service to fail on WhatsApp dispatch.
    pub fn set_fail_on_whatsapp(&self, fail: bool) {
        self.state.write().unwrap().fail_on_whatsapp = fail;
    }

    /// Returns the number of confirmation emails sent.
    pub fn email_count(&self) -> usize {
        self.state.read().unwrap().emails.len()
    }

    /// Returns the number of WhatsApp messages sent.
    pub fn whatsapp_count(&self) -> usize {
        self.state.read().unwrap().whatsapp.len()
    }

    /// Returns the location attached to the last WhatsApp message.
    pub fn last_whatsapp_location(&self) -> Option<GeoPoint> {
        self.state
            .read()
            .unwrap()
            .whatsapp
            .last()
            .and_then(|(_, _, location)| *location)
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_order_email(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        _review: Option<&ReviewSnapshot>,
    ) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_email {
            return Err(CheckoutError::Notification(
                "email gateway unavailable".to_string(),
            ));
        }

        state.emails.push((identity.clone(), order.order_id.clone()));
        Ok(())
    }

    async fn send_order_whatsapp(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        _review: Option<&ReviewSnapshot>,
        location: Option<&GeoPoint>,
    ) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_whatsapp {
            return Err(CheckoutError::Notification(
                "whatsapp dispatch failed".to_string(),
            ));
        }

        state
            .whatsapp
            .push((identity.clone(), order.order_id.clone(), location.copied()));
        Ok(())
    }
}

/// Formats the WhatsApp order message.
fn order_message(
    identity: &CustomerEmail,
    order: &PlacedOrder,
    review: Option<&ReviewSnapshot>,
    location: Option<&GeoPoint>,
) -> String {
    let mut message = format!(
        "New order {} from {}",
        order.order_id,
        identity.as_str()
    );
    if let Some(total) = order.total.or(review.map(|r| r.totals.total)) {
        message.push_str(&format!("\nTotal: {total}"));
    }
    if let Some(address) = review.and_then(|r| r.address.as_ref()) {
        message.push_str(&format!(
            "\nShip to: {}, {}, {} {}",
            address.recipient, address.line1, address.city, address.pincode
        ));
    }
    if let Some(point) = location {
        message.push_str(&format!(
            "\nLocation: https://maps.google.com/?q={},{}",
            point.latitude, point.longitude
        ));
    }
    message
}

/// Notification dispatch against the storefront backend.
///
/// Emails go through the backend's order-confirmation endpoint.
/// WhatsApp messages become `wa.me` deep links handed to the UI shell;
/// the link is logged here since only the shell can open it.
#[derive(Debug, Clone)]
pub struct HttpNotificationService {
    client: reqwest::Client,
    base_url: String,
    whatsapp_number: String,
}

impl HttpNotificationService {
    /// Creates a service against the configured API origin.
    ///
    /// The destination WhatsApp number comes from
    /// `STOREFRONT_WHATSAPP_NUMBER`, falling back to the store's
    /// order desk.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            whatsapp_number: std::env::var("STOREFRONT_WHATSAPP_NUMBER")
                .unwrap_or_else(|_| "919845651468".to_string()),
        }
    }

    /// Overrides the destination WhatsApp number.
    pub fn with_whatsapp_number(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_number = number.into();
        self
    }
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn send_order_email(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        _review: Option<&ReviewSnapshot>,
    ) -> Result<(), CheckoutError> {
        let response = self
            .client
            .post(format!(
                "{}/api/email/send-order-confirmation",
                self.base_url
            ))
            .json(&serde_json::json!({
                "to": identity.as_str(),
                "orderId": order.order_id.as_str(),
                "customerEmail": identity.as_str(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckoutError::Notification(format!(
                "confirmation email failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn send_order_whatsapp(
        &self,
        identity: &CustomerEmail,
        order: &PlacedOrder,
        review: Option<&ReviewSnapshot>,
        location: Option<&GeoPoint>,
    ) -> Result<(), CheckoutError> {
        let message = order_message(identity, order, review, location);
        let url = reqwest::Url::parse_with_params(
            &format!("https://wa.me/{}", self.whatsapp_number),
            &[("text", message.as_str())],
        )
        .map_err(|e| CheckoutError::Notification(e.to_string()))?;

        tracing::info!(order_id = %order.order_id, %url, "whatsapp order link prepared");
        Ok(())
    }
}
