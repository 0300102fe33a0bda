//! Totals computation and coupon rules.

use common::Money;
use domain::DeliveryOption;
use serde::{Deserialize, Serialize};

/// A percentage-off coupon with a minimum subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponRule {
    /// The coupon code.
    pub code: String,

    /// Minimum subtotal for the coupon to apply.
    pub min_subtotal: Money,

    /// Discount percentage off the subtotal.
    pub percent_off: u32,
}

impl CouponRule {
    /// Returns true if the coupon applies at the given subtotal.
    pub fn applies_at(&self, subtotal: Money) -> bool {
        subtotal >= self.min_subtotal
    }
}

/// Pricing rules for checkout totals.
///
/// Reads from environment variables, falling back to the storefront
/// defaults:
/// - `FREE_SHIPPING_THRESHOLD` — subtotal in rupees above which
///   shipping is free (default: `500`)
/// - `FLAT_SHIPPING_FEE` — shipping fee in rupees below the threshold
///   (default: `49`)
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    /// The coupon that auto-applies when the subtotal crosses its
    /// minimum.
    pub auto_coupon: CouponRule,
}

impl PricingConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            free_shipping_threshold: std::env::var("FREE_SHIPPING_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Money::from_rupees)
                .unwrap_or(defaults.free_shipping_threshold),
            flat_shipping_fee: std::env::var("FLAT_SHIPPING_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Money::from_rupees)
                .unwrap_or(defaults.flat_shipping_fee),
            auto_coupon: defaults.auto_coupon,
        }
    }

    /// Computes checkout totals.
    ///
    /// Shipping uses the selected delivery option's price, or the
    /// free-shipping threshold rule when no option is selected yet.
    /// The discount applies only while the applied coupon's minimum is
    /// met.
    pub fn totals(
        &self,
        subtotal: Money,
        delivery: Option<&DeliveryOption>,
        applied_coupon: Option<&str>,
    ) -> Totals {
        let shipping = match delivery {
            Some(option) => option.price,
            None if subtotal >= self.free_shipping_threshold => Money::zero(),
            None => self.flat_shipping_fee,
        };

        let discount = match applied_coupon {
            Some(code) if code == self.auto_coupon.code && self.auto_coupon.applies_at(subtotal) => {
                subtotal.percent(self.auto_coupon.percent_off)
            }
            _ => Money::zero(),
        };

        Totals {
            subtotal,
            shipping,
            discount,
            total: subtotal + shipping - discount,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_rupees(500),
            flat_shipping_fee: Money::from_rupees(49),
            auto_coupon: CouponRule {
                code: "FLAT10".to_string(),
                min_subtotal: Money::from_rupees(1499),
                percent_off: 10,
            },
        }
    }
}

/// Checkout totals breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line unit price × quantity.
    pub subtotal: Money,

    /// Delivery charge.
    pub shipping: Money,

    /// Coupon discount.
    pub discount: Money,

    /// `subtotal + shipping - discount`.
    pub total: Money,
}

impl Totals {
    /// Zeroed totals for an empty cart.
    pub fn zero() -> Self {
        Self {
            subtotal: Money::zero(),
            shipping: Money::zero(),
            discount: Money::zero(),
            total: Money::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    #[test]
    fn test_defaults() {
        let c = config();
        assert_eq!(c.free_shipping_threshold, Money::from_rupees(500));
        assert_eq!(c.flat_shipping_fee, Money::from_rupees(49));
        assert_eq!(c.auto_coupon.code, "FLAT10");
        assert_eq!(c.auto_coupon.min_subtotal, Money::from_rupees(1499));
        assert_eq!(c.auto_coupon.percent_off, 10);
    }

    #[test]
    fn test_flat_fee_below_threshold() {
        let totals = config().totals(Money::from_rupees(499), None, None);
        assert_eq!(totals.shipping, Money::from_rupees(49));
        assert_eq!(totals.total, Money::from_rupees(548));
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let totals = config().totals(Money::from_rupees(500), None, None);
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.total, Money::from_rupees(500));
    }

    #[test]
    fn test_selected_delivery_option_price_wins() {
        let express = DeliveryOption::new("express", "Express", Money::from_rupees(99));
        let totals = config().totals(Money::from_rupees(2000), Some(&express), None);
        assert_eq!(totals.shipping, Money::from_rupees(99));
    }

    #[test]
    fn test_coupon_below_minimum_gives_no_discount() {
        let totals = config().totals(Money::from_rupees(1498), None, Some("FLAT10"));
        assert_eq!(totals.discount, Money::zero());
    }

    #[test]
    fn test_coupon_at_minimum_discounts_ten_percent() {
        let totals = config().totals(Money::from_rupees(1499), None, Some("FLAT10"));
        assert_eq!(totals.discount, Money::from_paise(14990));
        // 1499.00 + 0 shipping - 149.90
        assert_eq!(totals.total, Money::from_paise(134910));
    }

    #[test]
    fn test_unknown_coupon_gives_no_discount() {
        let totals = config().totals(Money::from_rupees(2000), None, Some("SAVE50"));
        assert_eq!(totals.discount, Money::zero());
    }

    #[test]
    fn test_zero_totals() {
        let t = Totals::zero();
        assert!(t.subtotal.is_zero());
        assert!(t.total.is_zero());
    }
}
