//! Cart lines and saved-for-later lines.

use common::{LineId, Money, ProductId, VariantId};
use serde::{Deserialize, Serialize};

use crate::product::ProductRef;

/// One distinct purchasable unit in the cart.
///
/// The line ID is derived from product + variant, so two variants of
/// the same product occupy separate lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique line identity (product, or product-variant).
    pub line_id: LineId,

    /// The underlying product.
    pub product_id: ProductId,

    /// The chosen variant, if any.
    pub variant_id: Option<VariantId>,

    /// Variant display name.
    pub variant_name: Option<String>,

    /// Product name.
    pub name: String,

    /// Price per unit actually charged.
    pub unit_price: Money,

    /// Strike-through price per unit, informational.
    pub original_unit_price: Money,

    /// Quantity in the cart, always at least 1.
    pub quantity: u32,

    /// Product image reference.
    pub image: Option<String>,

    /// Catalog category.
    pub category: Option<String>,

    /// Brand name.
    pub brand: Option<String>,
}

impl CartLine {
    /// Builds a cart line from a product reference, deriving the line ID.
    pub fn from_product(product: &ProductRef, quantity: u32) -> Self {
        Self {
            line_id: LineId::for_product(&product.product_id, product.variant_id.as_ref()),
            product_id: product.product_id.clone(),
            variant_id: product.variant_id.clone(),
            variant_name: product.variant_name.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            original_unit_price: product.original_price_or_price(),
            quantity: quantity.max(1),
            image: product.image.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
        }
    }

    /// Returns the total price for this line (quantity * unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A cart line set aside for later purchase.
///
/// Saving fixes the quantity at 1; moving back to the cart restores a
/// quantity-1 line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedLine(CartLine);

impl SavedLine {
    /// Returns the underlying line (quantity 1).
    pub fn as_line(&self) -> &CartLine {
        &self.0
    }

    /// Returns the line identity.
    pub fn line_id(&self) -> &LineId {
        &self.0.line_id
    }

    /// Converts back into a quantity-1 cart line.
    pub fn into_cart_line(self) -> CartLine {
        self.0
    }
}

impl From<CartLine> for SavedLine {
    fn from(mut line: CartLine) -> Self {
        line.quantity = 1;
        Self(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRef {
        ProductRef::new("42", "Silk Saree", Money::from_rupees(100))
            .with_original_price(Money::from_rupees(120))
    }

    #[test]
    fn test_from_product_derives_line_id() {
        let line = CartLine::from_product(&product(), 2);
        assert_eq!(line.line_id.as_str(), "42");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.original_unit_price, Money::from_rupees(120));
    }

    #[test]
    fn test_from_product_with_variant() {
        let p = product().with_variant("7", "Maroon");
        let line = CartLine::from_product(&p, 1);
        assert_eq!(line.line_id.as_str(), "42-7");
        assert_eq!(line.variant_name.as_deref(), Some("Maroon"));
    }

    #[test]
    fn test_quantity_floor_is_one() {
        let line = CartLine::from_product(&product(), 0);
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::from_product(&product(), 3);
        assert_eq!(line.line_total(), Money::from_rupees(300));
    }

    #[test]
    fn test_save_fixes_quantity_at_one() {
        let line = CartLine::from_product(&product(), 5);
        let saved = SavedLine::from(line);
        assert_eq!(saved.as_line().quantity, 1);

        let restored = saved.into_cart_line();
        assert_eq!(restored.quantity, 1);
        assert_eq!(restored.line_id.as_str(), "42");
    }

    #[test]
    fn test_serialization_round_trip() {
        let line = CartLine::from_product(&product(), 2);
        let json = serde_json::to_string(&line).unwrap();
        let back: CartLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}
