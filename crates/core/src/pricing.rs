//! Cart pricing: subtotal, shipping fee, and total.
//!
//! Pricing is a pure function of the line items. It is recomputed on every
//! request from whatever the cart holds at that moment and is never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;

/// Subtotal above which shipping is free (strictly greater than).
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Shipping fee charged at or below the threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(7, 0, 0, false, 0);

/// How shipping is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Decimal,
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: FREE_SHIPPING_THRESHOLD,
            flat_fee: FLAT_SHIPPING_FEE,
        }
    }
}

impl ShippingPolicy {
    /// Shipping fee for a given subtotal.
    #[must_use]
    pub fn shipping_fee(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }

    /// How much more the visitor must spend before shipping becomes free.
    ///
    /// Zero once the subtotal is past the threshold. Because the comparison
    /// is strict, a subtotal exactly at the threshold still needs the
    /// smallest representable increment; this reports the plain difference.
    #[must_use]
    pub fn remaining_for_free_shipping(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.free_shipping_threshold - subtotal
        }
    }

    /// Price a sequence of line items.
    #[must_use]
    pub fn price(&self, items: &[CartLineItem]) -> PricingSnapshot {
        let subtotal: Decimal = items.iter().map(CartLineItem::line_total).sum();
        let shipping_fee = self.shipping_fee(subtotal);
        PricingSnapshot {
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

/// Derived totals for the current cart contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    /// Σ price × quantity, unrounded.
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    /// Always `subtotal + shipping_fee`.
    pub total: Decimal,
}

impl PricingSnapshot {
    /// Price items with the default [`ShippingPolicy`].
    #[must_use]
    pub fn for_items(items: &[CartLineItem]) -> Self {
        ShippingPolicy::default().price(items)
    }

    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}
