//! Checkout readiness state machine.
//!
//! ```text
//!            add              submit valid details
//!   Empty ────────▶ Reviewing ─────────────────────▶ Ready
//!     ▲                │  ▲                            │
//!     └── remove last ─┘  └── cart edit (reconfirm) ───┘
//! ```
//!
//! [`Checkout`] owns the cart and the customer details for one visitor.
//! Handlers load it, call one operation, and persist what changed. The
//! state is always derived from the held values, never stored.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartError, CartEvent, CartLineItem};
use crate::details::{UserDetails, ValidationErrors};
use crate::payment::{self, PaymentError, PaymentGate, PaymentMethod, PaymentRequest};
use crate::pricing::{PricingSnapshot, ShippingPolicy};
use crate::types::ProductId;

/// Where the visitor is in the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutState {
    /// No line items.
    Empty,
    /// Items present, details absent or not confirmed.
    Reviewing,
    /// Items present, details validated and saved.
    Ready,
}

/// What happens to saved details when the cart changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailsRetention {
    /// Details stay confirmed across cart edits.
    #[default]
    KeepAcrossEdits,
    /// Any cart edit requires the visitor to submit details again.
    ReconfirmOnEdit,
}

/// Per-store checkout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutPolicy {
    pub shipping: ShippingPolicy,
    pub payment_gate: PaymentGate,
    pub details_retention: DetailsRetention,
}

/// One visitor's checkout: cart, details, and the rules applied to them.
#[derive(Debug, Clone)]
pub struct Checkout {
    cart: Cart,
    details: Option<UserDetails>,
    details_confirmed: bool,
    policy: CheckoutPolicy,
}

impl Checkout {
    /// Start a checkout for a cart with no details on file.
    #[must_use]
    pub const fn new(cart: Cart, policy: CheckoutPolicy) -> Self {
        Self {
            cart,
            details: None,
            details_confirmed: false,
            policy,
        }
    }

    /// Attach details loaded from the store.
    ///
    /// `confirmed` is false when a previous cart edit invalidated them under
    /// [`DetailsRetention::ReconfirmOnEdit`].
    #[must_use]
    pub fn with_details(mut self, details: Option<UserDetails>, confirmed: bool) -> Self {
        self.details_confirmed = confirmed && details.is_some();
        self.details = details;
        self
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn details(&self) -> Option<&UserDetails> {
        self.details.as_ref()
    }

    #[must_use]
    pub const fn details_confirmed(&self) -> bool {
        self.details_confirmed
    }

    #[must_use]
    pub const fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Current readiness, derived from the cart and details.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        if self.cart.is_empty() {
            CheckoutState::Empty
        } else if self.details.is_some() && self.details_confirmed {
            CheckoutState::Ready
        } else {
            CheckoutState::Reviewing
        }
    }

    /// Totals for the cart as it is right now.
    #[must_use]
    pub fn pricing(&self) -> PricingSnapshot {
        self.policy.shipping.price(self.cart.items())
    }

    /// Add a line item.
    ///
    /// # Errors
    ///
    /// See [`Cart::add`].
    pub fn add_item(&mut self, item: CartLineItem) -> Result<CartEvent, CartError> {
        let event = self.cart.add(item)?;
        self.cart_edited();
        Ok(event)
    }

    /// Change a line item's quantity; values below one leave everything as is.
    ///
    /// # Errors
    ///
    /// See [`Cart::update_quantity`].
    pub fn update_quantity(
        &mut self,
        id: ProductId,
        new_quantity: i64,
    ) -> Result<CartEvent, CartError> {
        let event = self.cart.update_quantity(id, new_quantity)?;
        self.cart_edited();
        Ok(event)
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// See [`Cart::remove`].
    pub fn remove_item(&mut self, id: ProductId) -> Result<CartEvent, CartError> {
        let event = self.cart.remove(id)?;
        self.cart_edited();
        Ok(event)
    }

    /// Validate and accept a details submission.
    ///
    /// On success the record replaces whatever was held and counts as
    /// confirmed; the caller is responsible for persisting it. On failure the
    /// previously held details are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the per-field [`ValidationErrors`].
    pub fn submit_details(
        &mut self,
        candidate: UserDetails,
    ) -> Result<&UserDetails, ValidationErrors> {
        let validated = candidate.validate()?;
        self.details_confirmed = true;
        Ok(self.details.insert(validated))
    }

    /// Authorize a payment against the configured gate.
    ///
    /// # Errors
    ///
    /// See [`payment::authorize`].
    pub fn request_payment(&self, method: PaymentMethod) -> Result<PaymentRequest, PaymentError> {
        payment::authorize(
            method,
            self.state(),
            self.policy.payment_gate,
            self.pricing().total,
            self.details.as_ref(),
        )
    }

    fn cart_edited(&mut self) {
        if self.policy.details_retention == DetailsRetention::ReconfirmOnEdit {
            self.details_confirmed = false;
        }
    }
}
