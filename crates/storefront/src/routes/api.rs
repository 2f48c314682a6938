//! JSON API for the checkout.
//!
//! Mirrors what the cart page shows, for scripts and tests that would rather
//! not parse HTML.

use axum::{Json, extract::State};
use panier_core::{CartLineItem, CheckoutState, CurrencyCode, PricingSnapshot, UserDetails};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::services::checkout as checkout_service;
use crate::state::AppState;

/// Snapshot of a visitor's checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub state: CheckoutState,
    pub items: Vec<CartLineItem>,
    pub pricing: PricingSnapshot,
    pub details: Option<UserDetails>,
    pub currency: CurrencyCode,
}

/// `GET /api/checkout`
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutSnapshot>> {
    let checkout = checkout_service::load(&session, state.policy()).await?;

    Ok(Json(CheckoutSnapshot {
        state: checkout.state(),
        pricing: checkout.pricing(),
        currency: state.config().currency,
        items: checkout.cart().items().to_vec(),
        details: checkout.details().cloned(),
    }))
}
