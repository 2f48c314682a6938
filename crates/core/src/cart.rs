//! Cart line items and the operations that mutate them.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s, one per product.
//! Every mutation goes through a guarded method that either applies and
//! returns a [`CartEvent`] describing the change, or returns a [`CartError`]
//! and leaves the cart untouched. Callers use the returned event to notify
//! whatever else depends on the cart (pricing, badges, readiness).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Smallest quantity a line item may hold.
pub const MIN_QUANTITY: u32 = 1;

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the store currency. Never negative.
    pub price: Decimal,
    /// Always at least [`MIN_QUANTITY`].
    pub quantity: u32,
    /// Image path or URL.
    pub image: String,
}

impl CartLineItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Errors returned by rejected cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity is below [`MIN_QUANTITY`].
    #[error("quantity {requested} is below the minimum of 1")]
    QuantityBelowMinimum { requested: i64 },
    /// The requested quantity does not fit in a line item.
    #[error("quantity {requested} is too large")]
    QuantityTooLarge { requested: i64 },
    /// A line item was offered with a negative price.
    #[error("price for product {0} cannot be negative")]
    NegativePrice(ProductId),
    /// No line item exists for the product.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// A change applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new line item was appended.
    Added { id: ProductId, quantity: u32 },
    /// An existing line item's quantity changed.
    QuantityChanged {
        id: ProductId,
        previous: u32,
        current: u32,
    },
    /// A line item was removed; `now_empty` is set when it was the last one.
    Removed { id: ProductId, now_empty: bool },
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities, for the cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a line item.
    ///
    /// If the product is already in the cart its quantity grows by the
    /// item's quantity instead of a second line being appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityBelowMinimum`] for a zero quantity and
    /// [`CartError::NegativePrice`] for a negative unit price.
    pub fn add(&mut self, item: CartLineItem) -> Result<CartEvent, CartError> {
        if item.quantity < MIN_QUANTITY {
            return Err(CartError::QuantityBelowMinimum {
                requested: i64::from(item.quantity),
            });
        }
        if item.price < Decimal::ZERO {
            return Err(CartError::NegativePrice(item.id));
        }

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            let previous = existing.quantity;
            existing.quantity = previous.saturating_add(item.quantity);
            return Ok(CartEvent::QuantityChanged {
                id: item.id,
                previous,
                current: existing.quantity,
            });
        }

        let event = CartEvent::Added {
            id: item.id,
            quantity: item.quantity,
        };
        self.items.push(item);
        Ok(event)
    }

    /// Set the quantity of a line item.
    ///
    /// Requests below one are rejected rather than clamped, and the cart is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityBelowMinimum`],
    /// [`CartError::QuantityTooLarge`] or [`CartError::NotInCart`].
    pub fn update_quantity(
        &mut self,
        id: ProductId,
        new_quantity: i64,
    ) -> Result<CartEvent, CartError> {
        if new_quantity < i64::from(MIN_QUANTITY) {
            return Err(CartError::QuantityBelowMinimum {
                requested: new_quantity,
            });
        }
        let quantity = u32::try_from(new_quantity).map_err(|_| CartError::QuantityTooLarge {
            requested: new_quantity,
        })?;

        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(CartError::NotInCart(id))?;

        let previous = line.quantity;
        line.quantity = quantity;
        Ok(CartEvent::QuantityChanged {
            id,
            previous,
            current: quantity,
        })
    }

    /// Remove the line item for a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if there is no such line.
    pub fn remove(&mut self, id: ProductId) -> Result<CartEvent, CartError> {
        let position = self
            .items
            .iter()
            .position(|line| line.id == id)
            .ok_or(CartError::NotInCart(id))?;
        self.items.remove(position);
        Ok(CartEvent::Removed {
            id,
            now_empty: self.items.is_empty(),
        })
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, price: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(price, 0),
            quantity,
            image: format!("/static/img/{id}.jpg"),
        }
    }

    #[test]
    fn test_add_appends_new_line() {
        let mut cart = Cart::new();
        let event = cart.add(item(1, 100, 2)).unwrap();
        assert_eq!(
            event,
            CartEvent::Added {
                id: ProductId::new(1),
                quantity: 2
            }
        );
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_existing_product_merges_quantity() {
        let mut cart = Cart::new();
        cart.add(item(1, 100, 2)).unwrap();
        let event = cart.add(item(1, 100, 3)).unwrap();
        assert_eq!(
            event,
            CartEvent::QuantityChanged {
                id: ProductId::new(1),
                previous: 2,
                current: 5
            }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_rejects_zero_quantity_and_negative_price() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(item(1, 100, 0)),
            Err(CartError::QuantityBelowMinimum { requested: 0 })
        ));
        assert_eq!(
            cart.add(item(2, -5, 1)),
            Err(CartError::NegativePrice(ProductId::new(2)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_applies() {
        let mut cart = Cart::from(vec![item(1, 100, 2)]);
        let event = cart.update_quantity(ProductId::new(1), 4).unwrap();
        assert_eq!(
            event,
            CartEvent::QuantityChanged {
                id: ProductId::new(1),
                previous: 2,
                current: 4
            }
        );
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 4);
    }

    #[test]
    fn test_update_quantity_below_one_is_a_no_op() {
        let mut cart = Cart::from(vec![item(1, 100, 1), item(2, 50, 3)]);
        let before = cart.clone();

        for requested in [0, -1, i64::MIN] {
            assert_eq!(
                cart.update_quantity(ProductId::new(1), requested),
                Err(CartError::QuantityBelowMinimum { requested })
            );
        }
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_too_large() {
        let mut cart = Cart::from(vec![item(1, 100, 1)]);
        let requested = i64::from(u32::MAX) + 1;
        assert_eq!(
            cart.update_quantity(ProductId::new(1), requested),
            Err(CartError::QuantityTooLarge { requested })
        );
    }

    #[test]
    fn test_update_quantity_unknown_product() {
        let mut cart = Cart::from(vec![item(1, 100, 1)]);
        assert_eq!(
            cart.update_quantity(ProductId::new(9), 2),
            Err(CartError::NotInCart(ProductId::new(9)))
        );
    }

    #[test]
    fn test_remove_last_item_reports_empty() {
        let mut cart = Cart::from(vec![item(1, 100, 1), item(2, 50, 1)]);
        assert_eq!(
            cart.remove(ProductId::new(1)).unwrap(),
            CartEvent::Removed {
                id: ProductId::new(1),
                now_empty: false
            }
        );
        assert_eq!(
            cart.remove(ProductId::new(2)).unwrap(),
            CartEvent::Removed {
                id: ProductId::new(2),
                now_empty: true
            }
        );
        assert!(cart.is_empty());
        assert_eq!(
            cart.remove(ProductId::new(2)),
            Err(CartError::NotInCart(ProductId::new(2)))
        );
    }

    #[test]
    fn test_remove_preserves_order_of_remaining_items() {
        let mut cart = Cart::from(vec![item(1, 1, 1), item(2, 2, 1), item(3, 3, 1)]);
        cart.remove(ProductId::new(2)).unwrap();
        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let cart = Cart::from(vec![item(1, 100, 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
