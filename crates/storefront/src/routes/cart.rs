//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! HTMX requests get the cart panel back with a `cart-updated` trigger; plain
//! form posts are redirected to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use panier_core::{
    CartError, CartEvent, Checkout, CheckoutState, CurrencyCode, PaymentMethod, Price, ProductId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, HxRequest};
use crate::routes::checkout::DetailsFormView;
use crate::services::checkout as checkout_service;
use crate::state::AppState;

/// HTMX event fired whenever the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Payment button display data.
#[derive(Clone)]
pub struct PaymentButtonView {
    pub slug: &'static str,
    pub label: &'static str,
}

/// Cart and order summary display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub free_shipping: bool,
    /// How much more to spend for free shipping, when shipping is charged.
    pub remaining_for_free_shipping: Option<String>,
    pub can_pay: bool,
    pub payment_hint: Option<&'static str>,
    pub payment_methods: Vec<PaymentButtonView>,
}

impl CartView {
    /// Build the view from a checkout, pricing in `currency`.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout, currency: CurrencyCode) -> Self {
        let money = |amount: Decimal| Price::new(amount, currency).display();
        let pricing = checkout.pricing();
        let state = checkout.state();
        let can_pay = checkout.policy().payment_gate.allows(state);

        let remaining = checkout
            .policy()
            .shipping
            .remaining_for_free_shipping(pricing.subtotal);

        Self {
            items: checkout
                .cart()
                .items()
                .iter()
                .map(|item| CartItemView {
                    id: item.id,
                    name: item.name.clone(),
                    image: item.image.clone(),
                    quantity: item.quantity,
                    price: money(item.price),
                    line_price: money(item.line_total()),
                })
                .collect(),
            item_count: checkout.cart().total_quantity(),
            subtotal: money(pricing.subtotal),
            shipping_fee: money(pricing.shipping_fee),
            total: money(pricing.total),
            free_shipping: pricing.is_free_shipping(),
            remaining_for_free_shipping: (!pricing.is_free_shipping()).then(|| money(remaining)),
            can_pay,
            payment_hint: match (state, can_pay) {
                (_, true) => None,
                (CheckoutState::Empty, false) => Some("Add something to your cart to check out."),
                (_, false) => Some("Save your details to enable payment."),
            },
            payment_methods: PaymentMethod::ALL
                .iter()
                .map(|method| PaymentButtonView {
                    slug: method.slug(),
                    label: method.label(),
                })
                .collect(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    /// Signed so that requests below one reach the cart's guard.
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub form: DetailsFormView,
    pub cart_count: u64,
    pub nonce: String,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Respond to a cart mutation.
///
/// HTMX gets the refreshed panel, with the change trigger only when the cart
/// actually changed. Everyone else is sent back to the cart page.
fn cart_response(
    state: &AppState,
    checkout: &Checkout,
    HxRequest(is_htmx): HxRequest,
    event: Option<&CartEvent>,
) -> Response {
    if !is_htmx {
        return Redirect::to("/cart").into_response();
    }

    let panel = CartPanelTemplate {
        cart: CartView::from_checkout(checkout, state.config().currency),
    };
    if event.is_some() {
        (AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]), panel).into_response()
    } else {
        panel.into_response()
    }
}

/// Display cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let checkout = checkout_service::load(&session, state.policy()).await?;

    Ok(CartShowTemplate {
        cart: CartView::from_checkout(&checkout, state.config().currency),
        form: DetailsFormView::from_checkout(&checkout),
        cart_count: checkout.cart().total_quantity(),
        nonce,
    })
}

/// Add a catalog product to the cart.
///
/// Adding a product that is already in the cart increases its quantity.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .get(form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    let quantity = form.quantity.unwrap_or(1);

    let mut checkout = checkout_service::load(&session, state.policy()).await?;
    let event = checkout
        .add_item(product.line_item(quantity))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    checkout_service::persist_cart(&session, &checkout).await?;

    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    tracing::info!(?event, "Cart updated");

    Ok(cart_response(&state, &checkout, hx, Some(&event)))
}

/// Set the quantity of a line item.
///
/// Quantities below one leave the cart untouched.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut checkout = checkout_service::load(&session, state.policy()).await?;

    let event = match checkout.update_quantity(form.product_id, form.quantity) {
        Ok(event) => {
            checkout_service::persist_cart(&session, &checkout).await?;
            tracing::info!(?event, "Cart updated");
            Some(event)
        }
        Err(e @ (CartError::QuantityBelowMinimum { .. } | CartError::NotInCart(_))) => {
            tracing::debug!(error = %e, "Ignoring quantity update");
            None
        }
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };

    Ok(cart_response(&state, &checkout, hx, event.as_ref()))
}

/// Remove a line item.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut checkout = checkout_service::load(&session, state.policy()).await?;

    let event = match checkout.remove_item(form.product_id) {
        Ok(event) => {
            checkout_service::persist_cart(&session, &checkout).await?;
            let product_id = form.product_id.to_string();
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", product_id.as_str())]),
            );
            tracing::info!(?event, "Cart updated");
            Some(event)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring removal");
            None
        }
    };

    Ok(cart_response(&state, &checkout, hx, event.as_ref()))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let checkout = checkout_service::load(&session, state.policy()).await?;
    Ok(CartCountTemplate {
        count: checkout.cart().total_quantity(),
    })
}
