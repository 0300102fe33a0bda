//! Product reference passed into cart and wishlist operations.

use common::{Money, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// A product (or product variant) as handed to the cart by browsing UI.
///
/// Carries the fields the catalog exposes; everything beyond id and
/// price is optional because listing cards, detail pages and wishlist
/// rows hydrate different subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Selling price per unit.
    pub price: Money,

    /// Strike-through price, when the product is discounted.
    pub original_price: Option<Money>,

    /// Variant identifier, when a specific variant was chosen.
    pub variant_id: Option<VariantId>,

    /// Variant display name (e.g. weight or color).
    pub variant_name: Option<String>,

    /// Product image reference.
    pub image: Option<String>,

    /// Catalog category.
    pub category: Option<String>,

    /// Brand name.
    pub brand: Option<String>,

    /// Available stock, when the catalog exposes it.
    /// `None` means unknown; no stock guard applies.
    pub stock: Option<u32>,
}

impl ProductRef {
    /// Creates a product reference with the required fields.
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            original_price: None,
            variant_id: None,
            variant_name: None,
            image: None,
            category: None,
            brand: None,
            stock: None,
        }
    }

    /// Sets the strike-through price.
    pub fn with_original_price(mut self, price: Money) -> Self {
        self.original_price = Some(price);
        self
    }

    /// Sets the chosen variant.
    pub fn with_variant(mut self, id: impl Into<VariantId>, name: impl Into<String>) -> Self {
        self.variant_id = Some(id.into());
        self.variant_name = Some(name.into());
        self
    }

    /// Sets the product image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets category and brand.
    pub fn with_catalog_info(
        mut self,
        category: impl Into<String>,
        brand: impl Into<String>,
    ) -> Self {
        self.category = Some(category.into());
        self.brand = Some(brand.into());
        self
    }

    /// Sets the available stock.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Returns the effective strike-through price, falling back to the
    /// selling price when none is set.
    pub fn original_price_or_price(&self) -> Money {
        self.original_price.unwrap_or(self.price)
    }
}
