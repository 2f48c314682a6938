//! Payment methods and the gate that decides when they may be triggered.
//!
//! No money moves here. Authorizing a payment only produces a
//! [`PaymentRequest`] describing what would be charged; the storefront hands
//! it to a payment handler.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutState;
use crate::details::UserDetails;

/// Ways a visitor can pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Online card payment through the Konnekt gateway.
    Konnekt,
    /// Cash on delivery.
    Cash,
}

impl PaymentMethod {
    pub const ALL: [Self; 2] = [Self::Konnekt, Self::Cash];

    /// URL slug, as used in `/checkout/pay/{method}`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Konnekt => "konnekt",
            Self::Cash => "cash",
        }
    }

    /// Human label for buttons and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Konnekt => "Konnekt",
            Self::Cash => "Cash on delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when parsing an unknown payment method slug.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPaymentMethod(s.to_owned()))
    }
}

/// Which checkout states may trigger a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentGate {
    /// Payment only once customer details are validated and saved.
    #[default]
    RequireDetails,
    /// Payment whenever the cart has items, details or not.
    Unrestricted,
}

impl PaymentGate {
    /// Whether a checkout in `state` may pay.
    #[must_use]
    pub const fn allows(self, state: CheckoutState) -> bool {
        match (self, state) {
            (_, CheckoutState::Empty) => false,
            (Self::RequireDetails, CheckoutState::Reviewing) => false,
            (Self::Unrestricted, CheckoutState::Reviewing) | (_, CheckoutState::Ready) => true,
        }
    }
}

/// Error returned when parsing an unknown gate name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment gate: {0} (expected require-details or unrestricted)")]
pub struct UnknownPaymentGate(pub String);

impl FromStr for PaymentGate {
    type Err = UnknownPaymentGate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "require-details" => Ok(Self::RequireDetails),
            "unrestricted" => Ok(Self::Unrestricted),
            _ => Err(UnknownPaymentGate(s.to_owned())),
        }
    }
}

/// Reasons a payment is refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentError {
    /// Nothing to pay for.
    #[error("the cart is empty")]
    EmptyCart,
    /// The gate requires confirmed customer details first.
    #[error("customer details must be saved before paying")]
    DetailsRequired,
}

/// A payment the visitor asked for and the gate let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    /// Grand total including shipping.
    pub amount: Decimal,
    pub customer: Option<UserDetails>,
}

/// Decide whether a payment may proceed.
///
/// `readiness` is supplied by the caller rather than recomputed here, so the
/// caller controls what "ready" means for the request at hand.
///
/// # Errors
///
/// Returns [`PaymentError::EmptyCart`] in [`CheckoutState::Empty`] and
/// [`PaymentError::DetailsRequired`] when `gate` refuses a
/// [`CheckoutState::Reviewing`] checkout.
pub fn authorize(
    method: PaymentMethod,
    readiness: CheckoutState,
    gate: PaymentGate,
    amount: Decimal,
    customer: Option<&UserDetails>,
) -> Result<PaymentRequest, PaymentError> {
    if gate.allows(readiness) {
        return Ok(PaymentRequest {
            method,
            amount,
            customer: customer.cloned(),
        });
    }

    match readiness {
        CheckoutState::Empty => Err(PaymentError::EmptyCart),
        CheckoutState::Reviewing | CheckoutState::Ready => Err(PaymentError::DetailsRequired),
    }
}
