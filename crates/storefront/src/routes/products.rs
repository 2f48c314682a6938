//! Product listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use panier_core::{Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::Product;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::services::checkout as checkout_service;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl ProductView {
    fn new(product: &Product, state: &AppState) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: Price::new(product.price, state.config().currency).display(),
            image: product.image.clone(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub cart_count: u64,
    pub nonce: String,
}

/// Display the catalog with an add-to-cart form per product.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let checkout = checkout_service::load(&session, state.policy()).await?;
    let products = state
        .catalog()
        .products()
        .iter()
        .map(|product| ProductView::new(product, &state))
        .collect();

    Ok(ProductsIndexTemplate {
        products,
        cart_count: checkout.cart().total_quantity(),
        nonce,
    })
}
