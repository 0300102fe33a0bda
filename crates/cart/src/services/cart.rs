//! Remote cart service trait, in-memory fake, and HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerEmail, LineId, Money, ProductId};
use serde::Deserialize;

use crate::error::CartError;

use super::{ApiConfig, resolve_image_url};

/// One cart line as held server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCartLine {
    /// The product identifier (composite for variant lines).
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Resolved image URL.
    pub image_url: Option<String>,
    /// Price per unit captured at add time.
    pub price: Money,
    /// Strike-through price, when the product is discounted.
    pub original_price: Option<Money>,
    /// Quantity held server-side.
    pub quantity: u32,
}

/// Server response to an add-to-cart call.
///
/// The returned quantity is the server-accumulated total for the line
/// and is authoritative for the client's local copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCartAdd {
    /// Accumulated quantity for the line after the add.
    pub quantity: u32,
    /// Price per unit the server recorded.
    pub price: Money,
    /// Strike-through price, when known.
    pub original_price: Option<Money>,
    /// Image URL the server holds for the line.
    pub image_url: Option<String>,
}

/// Request payload for an add-to-cart call.
#[derive(Debug, Clone, PartialEq)]
pub struct AddItemRequest {
    /// The cart line being added (product, or product-variant).
    pub line_id: LineId,
    /// Quantity to add on top of any existing server-side quantity.
    pub quantity: u32,
}

/// Trait for the remote cart service.
#[async_trait]
pub trait RemoteCartService: Send + Sync {
    /// Fetches the full server-side cart for the given identity.
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteCartLine>, CartError>;

    /// Adds quantity to a line, returning the accumulated state.
    async fn add(
        &self,
        identity: &CustomerEmail,
        request: AddItemRequest,
    ) -> Result<RemoteCartAdd, CartError>;

    /// Sets a line's quantity to an absolute value.
    async fn update(
        &self,
        identity: &CustomerEmail,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<(), CartError>;

    /// Removes a line from the server-side cart.
    async fn remove(&self, identity: &CustomerEmail, line_id: &LineId) -> Result<(), CartError>;
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    image_url: Option<String>,
    price: Money,
    original_price: Option<Money>,
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    catalog: HashMap<LineId, CatalogEntry>,
    carts: HashMap<CustomerEmail, Vec<(LineId, u32)>>,
    add_calls: u32,
    update_calls: u32,
    remove_calls: u32,
    fail_on_fetch: bool,
    fail_on_add: bool,
    fail_on_update: bool,
    fail_on_remove: bool,
}

/// In-memory cart service for testing.
///
/// Accumulates quantities per line the way the real backend does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers product metadata the service echoes back on adds.
    pub fn register_product(
        &self,
        line_id: impl Into<LineId>,
        name: impl Into<String>,
        price: Money,
    ) {
        self.state.write().unwrap().catalog.insert(
            line_id.into(),
            CatalogEntry {
                name: name.into(),
                image_url: None,
                price,
                original_price: None,
            },
        );
    }

    /// Seeds a server-side cart line for an identity.
    pub fn seed_line(&self, identity: &CustomerEmail, line: RemoteCartLine) {
        let mut state = self.state.write().unwrap();
        let line_id = LineId::from(line.product_id.as_str());
        state.catalog.insert(
            line_id.clone(),
            CatalogEntry {
                name: line.name,
                image_url: line.image_url,
                price: line.price,
                original_price: line.original_price,
            },
        );
        state
            .carts
            .entry(identity.clone())
            .or_default()
            .push((line_id, line.quantity));
    }

    /// Configures the service to fail on fetch calls.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }

    /// Configures the service to fail on add calls.
    pub fn set_fail_on_add(&self, fail: bool) {
        self.state.write().unwrap().fail_on_add = fail;
    }

    /// Configures the service to fail on update calls.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.state.write().unwrap().fail_on_update = fail;
    }

    /// Configures the service to fail on remove calls.
    pub fn set_fail_on_remove(&self, fail: bool) {
        self.state.write().unwrap().fail_on_remove = fail;
    }

    /// Returns the number of add calls received.
    pub fn add_call_count(&self) -> u32 {
        self.state.read().unwrap().add_calls
    }

    /// Returns the number of update calls received.
    pub fn update_call_count(&self) -> u32 {
        self.state.read().unwrap().update_calls
    }

    /// Returns the number of remove calls received.
    pub fn remove_call_count(&self) -> u32 {
        self.state.read().unwrap().remove_calls
    }

    /// Returns the server-side quantity for a line, if present.
    pub fn quantity_of(&self, identity: &CustomerEmail, line_id: &LineId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .carts
            .get(identity)
            .and_then(|cart| {
                cart.iter()
                    .find(|(id, _)| id == line_id)
                    .map(|(_, qty)| *qty)
            })
    }
}

#[async_trait]
impl RemoteCartService for InMemoryCartService {
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteCartLine>, CartError> {
        let state = self.state.read().unwrap();

        if state.fail_on_fetch {
            return Err(CartError::CartService("cart unavailable".to_string()));
        }

        let Some(cart) = state.carts.get(identity) else {
            return Ok(Vec::new());
        };

        Ok(cart
            .iter()
            .map(|(line_id, quantity)| {
                let entry = state.catalog.get(line_id);
                RemoteCartLine {
                    product_id: ProductId::new(line_id.as_str()),
                    name: entry.map(|e| e.name.clone()).unwrap_or_default(),
                    image_url: entry.and_then(|e| e.image_url.clone()),
                    price: entry.map(|e| e.price).unwrap_or_default(),
                    original_price: entry.and_then(|e| e.original_price),
                    quantity: *quantity,
                }
            })
            .collect())
    }

    async fn add(
        &self,
        identity: &CustomerEmail,
        request: AddItemRequest,
    ) -> Result<RemoteCartAdd, CartError> {
        let mut state = self.state.write().unwrap();
        state.add_calls += 1;

        if state.fail_on_add {
            return Err(CartError::CartService(
                "Failed to add to cart. Please try again.".to_string(),
            ));
        }

        let entry = state.catalog.get(&request.line_id).cloned();
        let cart = state.carts.entry(identity.clone()).or_default();
        let accumulated = match cart.iter_mut().find(|(id, _)| *id == request.line_id) {
            Some((_, qty)) => {
                *qty += request.quantity;
                *qty
            }
            None => {
                cart.push((request.line_id.clone(), request.quantity));
                request.quantity
            }
        };

        Ok(RemoteCartAdd {
            quantity: accumulated,
            price: entry.as_ref().map(|e| e.price).unwrap_or_default(),
            original_price: entry.as_ref().and_then(|e| e.original_price),
            image_url: entry.and_then(|e| e.image_url),
        })
    }

    async fn update(
        &self,
        identity: &CustomerEmail,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        state.update_calls += 1;

        if state.fail_on_update {
            return Err(CartError::CartService("cart update failed".to_string()));
        }

        if let Some(cart) = state.carts.get_mut(identity)
            && let Some((_, qty)) = cart.iter_mut().find(|(id, _)| id == line_id)
        {
            *qty = quantity;
        }
        Ok(())
    }

    async fn remove(&self, identity: &CustomerEmail, line_id: &LineId) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        state.remove_calls += 1;

        if state.fail_on_remove {
            return Err(CartError::CartService("cart remove failed".to_string()));
        }

        if let Some(cart) = state.carts.get_mut(identity) {
            cart.retain(|(id, _)| id != line_id);
        }
        Ok(())
    }
}

/// Product/line identifiers arrive as numbers for plain products and
/// strings for composite variant lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdWire {
    Num(i64),
    Str(String),
}

impl IdWire {
    pub(crate) fn into_string(self) -> String {
        match self {
            IdWire::Num(n) => n.to_string(),
            IdWire::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartLineWire {
    product_id: IdWire,
    name: String,
    image_url: Option<String>,
    price: f64,
    original_price: Option<f64>,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartAddWire {
    quantity: u32,
    price: f64,
    original_price: Option<f64>,
    image_url: Option<String>,
}

/// HTTP client for the cart endpoints of the storefront API.
///
/// Identity travels as the `email` query parameter on every call.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCartService {
    /// Creates a client against the configured API origin.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl RemoteCartService for HttpCartService {
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteCartLine>, CartError> {
        let response = self
            .client
            .get(format!("{}/api/cart", self.base_url))
            .query(&[("email", identity.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::CartService(format!(
                "cart fetch failed: HTTP {}",
                response.status()
            )));
        }

        let wire: Vec<CartLineWire> = response.json().await?;
        Ok(wire
            .into_iter()
            .map(|w| RemoteCartLine {
                product_id: ProductId::new(w.product_id.into_string()),
                name: w.name,
                image_url: Some(resolve_image_url(&self.base_url, w.image_url.as_deref())),
                price: Money::from_rupees_f64(w.price),
                original_price: w.original_price.map(Money::from_rupees_f64),
                quantity: w.quantity,
            })
            .collect())
    }

    async fn add(
        &self,
        identity: &CustomerEmail,
        request: AddItemRequest,
    ) -> Result<RemoteCartAdd, CartError> {
        let response = self
            .client
            .post(format!("{}/api/cart/add", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(&serde_json::json!({
                "productId": request.line_id.as_str(),
                "quantity": request.quantity,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::CartService(format!(
                "cart add failed: HTTP {}",
                response.status()
            )));
        }

        let wire: CartAddWire = response.json().await?;
        Ok(RemoteCartAdd {
            quantity: wire.quantity,
            price: Money::from_rupees_f64(wire.price),
            original_price: wire.original_price.map(Money::from_rupees_f64),
            image_url: wire
                .image_url
                .map(|url| resolve_image_url(&self.base_url, Some(&url))),
        })
    }

    async fn update(
        &self,
        identity: &CustomerEmail,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let response = self
            .client
            .post(format!("{}/api/cart/update", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(&serde_json::json!({
                "productId": line_id.as_str(),
                "quantity": quantity,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::CartService(format!(
                "cart update failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn remove(&self, identity: &CustomerEmail, line_id: &LineId) -> Result<(), CartError> {
        let response = self
            .client
            .post(format!("{}/api/cart/remove", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(&serde_json::json!({ "productId": line_id.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::CartService(format!(
                "cart remove failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CustomerEmail {
        CustomerEmail::new("a@example.com")
    }

    #[tokio::test]
    async fn test_add_accumulates_quantity() {
        let service = InMemoryCartService::new();
        service.register_product("42", "Silk Saree", Money::from_rupees(999));

        let first = service
            .add(
                &identity(),
                AddItemRequest {
                    line_id: "42".into(),
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(first.quantity, 2);

        let second = service
            .add(
                &identity(),
                AddItemRequest {
                    line_id: "42".into(),
                    quantity: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(second.quantity, 3);
        assert_eq!(second.price, Money::from_rupees(999));
        assert_eq!(service.add_call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_returns_seeded_lines() {
        let service = InMemoryCartService::new();
        service.seed_line(
            &identity(),
            RemoteCartLine {
                product_id: ProductId::new("42"),
                name: "Silk Saree".to_string(),
                image_url: None,
                price: Money::from_rupees(999),
                original_price: Some(Money::from_rupees(1199)),
                quantity: 2,
            },
        );

        let lines = service.fetch(&identity()).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].original_price, Some(Money::from_rupees(1199)));
    }

    #[tokio::test]
    async fn test_fetch_for_unknown_identity_is_empty() {
        let service = InMemoryCartService::new();
        assert!(service.fetch(&identity()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_on_add() {
        let service = InMemoryCartService::new();
        service.set_fail_on_add(true);

        let result = service
            .add(
                &identity(),
                AddItemRequest {
                    line_id: "42".into(),
                    quantity: 1,
                },
            )
            .await;
        assert!(matches!(result, Err(CartError::CartService(_))));
        assert_eq!(service.quantity_of(&identity(), &"42".into()), None);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let service = InMemoryCartService::new();
        service.register_product("42", "Silk Saree", Money::from_rupees(999));
        service
            .add(
                &identity(),
                AddItemRequest {
                    line_id: "42".into(),
                    quantity: 2,
                },
            )
            .await
            .unwrap();

        service.update(&identity(), &"42".into(), 5).await.unwrap();
        assert_eq!(service.quantity_of(&identity(), &"42".into()), Some(5));

        service.remove(&identity(), &"42".into()).await.unwrap();
        assert_eq!(service.quantity_of(&identity(), &"42".into()), None);
        assert_eq!(service.update_call_count(), 1);
        assert_eq!(service.remove_call_count(), 1);
    }
}
