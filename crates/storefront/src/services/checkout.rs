//! Loading and persisting a visitor's checkout.
//!
//! Each request rebuilds a [`Checkout`] from the session, applies one
//! operation to it, and writes the cart back. Pricing is never stored; it is
//! recomputed from the cart that was just written.

use panier_core::{Cart, Checkout, CheckoutPolicy, UserDetails, ValidationErrors};
use tower_sessions::Session;

use super::details_store::{SessionDetailsStore, StoreError, UserDetailsStore};
use crate::models::session_keys;

/// Rebuild the visitor's checkout from their session.
///
/// Details already on file count as confirmed unless a cart edit under the
/// reconfirm policy marked them otherwise.
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn load(session: &Session, policy: CheckoutPolicy) -> Result<Checkout, StoreError> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default();
    let details = SessionDetailsStore::new(session.clone()).get().await;
    let confirmed = session
        .get::<bool>(session_keys::DETAILS_CONFIRMED)
        .await?
        .unwrap_or(true);

    Ok(Checkout::new(cart, policy).with_details(details, confirmed))
}

/// Write the cart and the confirmation flag back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn persist_cart(session: &Session, checkout: &Checkout) -> Result<(), StoreError> {
    session.insert(session_keys::CART, checkout.cart()).await?;
    session
        .insert(session_keys::DETAILS_CONFIRMED, checkout.details_confirmed())
        .await?;
    Ok(())
}

/// Validate a details submission and save it.
///
/// Saving is best-effort: if the store fails the error is logged and the
/// validated record is still returned, so the visitor can proceed.
///
/// # Errors
///
/// Returns the per-field errors if validation fails; nothing is saved then.
pub async fn submit_details<S>(
    session: &Session,
    checkout: &mut Checkout,
    store: &S,
    candidate: UserDetails,
) -> Result<UserDetails, ValidationErrors>
where
    S: UserDetailsStore + Sync,
{
    let details = checkout.submit_details(candidate)?.clone();

    if let Err(e) = store.save(&details).await {
        tracing::warn!(error = %e, "Failed to save customer details, continuing unsaved");
    }
    if let Err(e) = session
        .insert(session_keys::DETAILS_CONFIRMED, checkout.details_confirmed())
        .await
    {
        tracing::warn!(error = %e, "Failed to record details confirmation");
    }

    Ok(details)
}
