//! Checkout route handlers: customer details and payment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use panier_core::{Checkout, DetailField, PaymentMethod, Price, UserDetails, ValidationErrors};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, HxRequest};
use crate::routes::cart::{CartShowTemplate, CartView};
use crate::services::{SessionDetailsStore, checkout as checkout_service};
use crate::state::AppState;

/// One input of the details form.
#[derive(Clone)]
pub struct DetailInputView {
    pub key: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub autocomplete: &'static str,
    pub value: String,
    pub error: Option<String>,
}

/// Details form display data for templates.
#[derive(Clone)]
pub struct DetailsFormView {
    pub inputs: Vec<DetailInputView>,
    /// The record was just saved.
    pub saved: bool,
    /// Details are on file but must be submitted again.
    pub needs_reconfirm: bool,
}

const fn label(field: DetailField) -> &'static str {
    match field {
        DetailField::FirstName => "First name",
        DetailField::LastName => "Last name",
        DetailField::Phone => "Phone",
        DetailField::Email => "Email",
        DetailField::Address => "Address",
        DetailField::Country => "Country",
        DetailField::ZipCode => "Zip code",
    }
}

const fn input_type(field: DetailField) -> &'static str {
    match field {
        DetailField::Phone => "tel",
        DetailField::Email => "email",
        _ => "text",
    }
}

const fn autocomplete(field: DetailField) -> &'static str {
    match field {
        DetailField::FirstName => "given-name",
        DetailField::LastName => "family-name",
        DetailField::Phone => "tel",
        DetailField::Email => "email",
        DetailField::Address => "street-address",
        DetailField::Country => "country-name",
        DetailField::ZipCode => "postal-code",
    }
}

impl DetailsFormView {
    /// A form showing `values`, with `errors` next to the failing inputs.
    #[must_use]
    pub fn new(values: &UserDetails, errors: Option<&ValidationErrors>) -> Self {
        let inputs = DetailField::ALL
            .into_iter()
            .map(|field| DetailInputView {
                key: field.key(),
                label: label(field),
                input_type: input_type(field),
                autocomplete: autocomplete(field),
                value: values.field(field).to_string(),
                error: errors.and_then(|e| e.get(field)).map(str::to_string),
            })
            .collect();
        Self {
            inputs,
            saved: false,
            needs_reconfirm: false,
        }
    }

    /// The form prefilled from the saved record.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout) -> Self {
        let details = checkout.details().cloned().unwrap_or_default();
        Self {
            needs_reconfirm: checkout.details().is_some() && !checkout.details_confirmed(),
            ..Self::new(&details, None)
        }
    }
}

/// Details form fragment plus the refreshed payment buttons (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/details_response.html")]
pub struct DetailsResponseTemplate {
    pub form: DetailsFormView,
    pub cart: CartView,
}

/// Payment acknowledgement fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/payment_status.html")]
pub struct PaymentStatusTemplate {
    pub message: String,
    pub reference: String,
    pub amount: String,
}

/// Payment acknowledgement page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentPageTemplate {
    pub message: String,
    pub reference: String,
    pub amount: String,
    pub cart_count: u64,
    pub nonce: String,
}

/// Validate and save the customer details.
///
/// On failure nothing is saved and the form comes back with a message next
/// to each failing field, as a 422.
#[instrument(skip(state, session, nonce, form))]
pub async fn submit_details(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<UserDetails>,
) -> Result<Response> {
    let mut checkout = checkout_service::load(&session, state.policy()).await?;
    let store = SessionDetailsStore::new(session.clone());
    let currency = state.config().currency;

    match checkout_service::submit_details(&session, &mut checkout, &store, form.clone()).await {
        Ok(_) => {
            add_breadcrumb("checkout", "Saved customer details", None);
            tracing::info!(state = ?checkout.state(), "Customer details saved");

            if !is_htmx {
                return Ok(Redirect::to("/cart").into_response());
            }
            Ok(DetailsResponseTemplate {
                form: DetailsFormView {
                    saved: true,
                    ..DetailsFormView::from_checkout(&checkout)
                },
                cart: CartView::from_checkout(&checkout, currency),
            }
            .into_response())
        }
        Err(errors) => {
            tracing::info!(fields = errors.len(), "Customer details rejected");
            let form = DetailsFormView::new(&form, Some(&errors));
            let cart = CartView::from_checkout(&checkout, currency);

            if is_htmx {
                return Ok(
                    (StatusCode::UNPROCESSABLE_ENTITY, DetailsResponseTemplate { form, cart })
                        .into_response(),
                );
            }
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                CartShowTemplate {
                    cart,
                    form,
                    cart_count: checkout.cart().total_quantity(),
                    nonce,
                },
            )
                .into_response())
        }
    }
}

/// Start a payment with the chosen method.
///
/// Refused with 409 while the payment gate does not allow the checkout's
/// current state.
#[instrument(skip(state, session, nonce))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Path(method): Path<String>,
) -> Result<Response> {
    let method: PaymentMethod = method
        .parse()
        .map_err(|_| AppError::NotFound(format!("payment method {method}")))?;

    let checkout = checkout_service::load(&session, state.policy()).await?;
    let request = checkout.request_payment(method).inspect_err(|e| {
        tracing::info!(%method, error = %e, "Payment refused");
    })?;

    let handler = state
        .payments()
        .for_method(method)
        .ok_or_else(|| AppError::Internal(format!("no handler registered for {method}")))?;
    let ack = handler.initiate(&request);

    add_breadcrumb("checkout", "Payment requested", Some(&[("method", method.slug())]));
    tracing::info!(
        %method,
        reference = %ack.reference,
        total = %request.amount,
        "Payment requested"
    );

    let amount = Price::new(request.amount, state.config().currency).display();
    if is_htmx {
        return Ok(PaymentStatusTemplate {
            message: ack.message,
            reference: ack.reference.to_string(),
            amount,
        }
        .into_response());
    }
    Ok(PaymentPageTemplate {
        message: ack.message,
        reference: ack.reference.to_string(),
        amount,
        cart_count: checkout.cart().total_quantity(),
        nonce,
    }
    .into_response())
}
