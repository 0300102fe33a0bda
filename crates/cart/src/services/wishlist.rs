//! Wishlist service trait, in-memory fake, and HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerEmail, Money, ProductId};
use serde::Deserialize;

use crate::error::CartError;

use super::{ApiConfig, resolve_image_url};

/// One wishlist entry as held server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteWishlistLine {
    /// The product identifier.
    pub product_id: ProductId,
    /// Product name.
    pub product_name: String,
    /// Resolved image URL.
    pub product_image: Option<String>,
    /// Current selling price.
    pub product_price: Money,
    /// Whether the product is in stock.
    pub in_stock: bool,
    /// Remaining stock, when known.
    pub stock_quantity: Option<u32>,
    /// Catalog category.
    pub category: Option<String>,
    /// Brand name.
    pub brand: Option<String>,
    /// When the entry was created server-side.
    pub created_at: Option<DateTime<Utc>>,
}

/// Trait for the remote wishlist service.
#[async_trait]
pub trait WishlistService: Send + Sync {
    /// Fetches all wishlist entries for the given identity.
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteWishlistLine>, CartError>;

    /// Adds a product to the wishlist.
    async fn add(&self, identity: &CustomerEmail, product_id: &ProductId) -> Result<(), CartError>;

    /// Removes a product from the wishlist.
    async fn remove(
        &self,
        identity: &CustomerEmail,
        product_id: &ProductId,
    ) -> Result<(), CartError>;
}

#[derive(Debug, Default)]
struct InMemoryWishlistState {
    entries: HashMap<CustomerEmail, Vec<RemoteWishlistLine>>,
    add_calls: u32,
    remove_calls: u32,
    fail_on_fetch: bool,
    fail_on_add: bool,
    fail_on_remove: bool,
}

/// In-memory wishlist service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWishlistService {
    state: Arc<RwLock<InMemoryWishlistState>>,
}

impl InMemoryWishlistService {
    /// Creates a new in-memory wishlist service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a server-side wishlist entry for an identity.
    pub fn seed_entry(&self, identity: &CustomerEmail, entry: RemoteWishlistLine) {
        self.state
            .write()
            .unwrap()
            .entries
            .entry(identity.clone())
            .or_default()
            .push(entry);
    }

    /// Configures the service to fail on fetch calls.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }

    /// Configures the service to fail on add calls.
    pub fn set_fail_on_add(&self, fail: bool) {
        self.state.write().unwrap().fail_on_add = fail;
    }

    /// Configures the service to fail on remove calls.
    pub fn set_fail_on_remove(&self, fail: bool) {
        self.state.write().unwrap().fail_on_remove = fail;
    }

    /// Returns the number of add calls received.
    pub fn add_call_count(&self) -> u32 {
        self.state.read().unwrap().add_calls
    }

    /// Returns the number of remove calls received.
    pub fn remove_call_count(&self) -> u32 {
        self.state.read().unwrap().remove_calls
    }

    /// Returns true if the identity's wishlist contains the product.
    pub fn has_product(&self, identity: &CustomerEmail, product_id: &ProductId) -> bool {
        self.state
            .read()
            .unwrap()
            .entries
            .get(identity)
            .is_some_and(|entries| entries.iter().any(|e| &e.product_id == product_id))
    }
}

#[async_trait]
impl WishlistService for InMemoryWishlistService {
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteWishlistLine>, CartError> {
        let state = self.state.read().unwrap();

        if state.fail_on_fetch {
            return Err(CartError::WishlistService(
                "wishlist unavailable".to_string(),
            ));
        }

        Ok(state.entries.get(identity).cloned().unwrap_or_default())
    }

    async fn add(&self, identity: &CustomerEmail, product_id: &ProductId) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        state.add_calls += 1;

        if state.fail_on_add {
            return Err(CartError::WishlistService(
                "Failed to add to wishlist".to_string(),
            ));
        }

        let entries = state.entries.entry(identity.clone()).or_default();
        if !entries.iter().any(|e| &e.product_id == product_id) {
            entries.push(RemoteWishlistLine {
                product_id: product_id.clone(),
                product_name: String::new(),
                product_image: None,
                product_price: Money::zero(),
                in_stock: true,
                stock_quantity: None,
                category: None,
                brand: None,
                created_at: Some(Utc::now()),
            });
        }
        Ok(())
    }

    async fn remove(
        &self,
        identity: &CustomerEmail,
        product_id: &ProductId,
    ) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        state.remove_calls += 1;

        if state.fail_on_remove {
            return Err(CartError::WishlistService(
                "Failed to remove from wishlist".to_string(),
            ));
        }

        if let Some(entries) = state.entries.get_mut(identity) {
            entries.retain(|e| &e.product_id != product_id);
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistLineWire {
    product_id: super::cart::IdWire,
    product_name: String,
    product_image: Option<String>,
    product_price: f64,
    #[serde(default = "default_true")]
    in_stock: bool,
    stock_quantity: Option<u32>,
    category: Option<String>,
    brand: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

/// HTTP client for the wishlist endpoints of the storefront API.
#[derive(Debug, Clone)]
pub struct HttpWishlistService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWishlistService {
    /// Creates a client against the configured API origin.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl WishlistService for HttpWishlistService {
    async fn fetch(&self, identity: &CustomerEmail) -> Result<Vec<RemoteWishlistLine>, CartError> {
        let response = self
            .client
            .get(format!("{}/api/wishlist", self.base_url))
            .query(&[("email", identity.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::WishlistService(format!(
                "wishlist fetch failed: HTTP {}",
                response.status()
            )));
        }

        let wire: Vec<WishlistLineWire> = response.json().await?;
        Ok(wire
            .into_iter()
            .map(|w| RemoteWishlistLine {
                product_id: ProductId::new(w.product_id.into_string()),
                product_name: w.product_name,
                product_image: Some(resolve_image_url(&self.base_url, w.product_image.as_deref())),
                product_price: Money::from_rupees_f64(w.product_price),
                in_stock: w.in_stock,
                stock_quantity: w.stock_quantity,
                category: w.category,
                brand: w.brand,
                created_at: w.created_at,
            })
            .collect())
    }

    async fn add(&self, identity: &CustomerEmail, product_id: &ProductId) -> Result<(), CartError> {
        let response = self
            .client
            .post(format!("{}/api/wishlist/add", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(&serde_json::json!({ "productId": product_id.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::WishlistService(format!(
                "wishlist add failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn remove(
        &self,
        identity: &CustomerEmail,
        product_id: &ProductId,
    ) -> Result<(), CartError> {
        let response = self
            .client
            .post(format!("{}/api/wishlist/remove", self.base_url))
            .query(&[("email", identity.as_str())])
            .json(&serde_json::json!({ "productId": product_id.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CartError::WishlistService(format!(
                "wishlist remove failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}
