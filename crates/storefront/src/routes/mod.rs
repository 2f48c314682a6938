//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product listing
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments, 303 to /cart without HTMX)
//! GET  /cart                   - Checkout page
//! POST /cart/add               - Add a catalog product
//! POST /cart/update            - Set a line item's quantity
//! POST /cart/remove            - Remove a line item
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout/details       - Validate and save customer details
//! POST /checkout/pay/{method}  - Start a Konnekt or cash payment
//!
//! # API
//! GET  /api/checkout           - Checkout snapshot as JSON
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/details", post(checkout::submit_details))
        .route("/pay/{method}", post(checkout::pay))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/api/checkout", get(api::checkout))
}
