//! Wishlist entries.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::product::ProductRef;

/// A product the customer has marked interest in.
///
/// Quantity-less and unique per product ID; adds toggle rather than
/// duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistLine {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name.
    pub name: String,

    /// Product image reference.
    pub image: Option<String>,

    /// Current selling price.
    pub price: Money,

    /// Strike-through price, informational.
    pub original_price: Money,

    /// Whether the product is currently in stock.
    pub in_stock: bool,

    /// Remaining stock, when known.
    pub stock_quantity: Option<u32>,

    /// Catalog category.
    pub category: Option<String>,

    /// Brand name.
    pub brand: Option<String>,

    /// When the entry was added.
    pub added_at: DateTime<Utc>,
}

impl WishlistLine {
    /// Builds a wishlist entry from a product reference.
    ///
    /// Products without an explicit stock figure are treated as in
    /// stock.
    pub fn from_product(product: &ProductRef, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            original_price: product.original_price_or_price(),
            in_stock: product.stock.map(|s| s > 0).unwrap_or(true),
            stock_quantity: product.stock,
            category: product.category.clone(),
            brand: product.brand.clone(),
            added_at,
        }
    }
}
