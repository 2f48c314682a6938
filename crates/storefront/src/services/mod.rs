//! Business logic services for storefront.
//!
//! # Services
//!
//! - `details_store` - The single saved customer details record
//! - `checkout` - Loading and persisting a visitor's checkout
//! - `payments` - Payment handlers behind the checkout buttons

pub mod checkout;
pub mod details_store;
pub mod payments;

pub use details_store::{SessionDetailsStore, StoreError, UserDetailsStore};
pub use payments::{PaymentAck, PaymentHandler, PaymentHandlers};
