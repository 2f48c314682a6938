//! Panier Core - Cart and checkout domain library.
//!
//! This crate provides the domain logic shared by the Panier components:
//! - `storefront` - Public-facing cart and checkout site
//! - `integration-tests` - End-to-end tests for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! sessions, no HTTP. Every operation is synchronous and works on values the
//! caller owns, so the same logic runs in handlers and in tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, and emails
//! - [`cart`] - Line items and the guarded cart mutations
//! - [`pricing`] - Subtotal, shipping fee, and total computation
//! - [`details`] - Customer details record and its validation rules
//! - [`checkout`] - Checkout readiness state machine
//! - [`payment`] - Payment methods and the readiness gate in front of them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod details;
pub mod payment;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartError, CartEvent, CartLineItem};
pub use checkout::{Checkout, CheckoutPolicy, CheckoutState, DetailsRetention};
pub use details::{DetailField, UserDetails, ValidationErrors};
pub use payment::{PaymentError, PaymentGate, PaymentMethod, PaymentRequest};
pub use pricing::{PricingSnapshot, ShippingPolicy};
pub use types::*;
