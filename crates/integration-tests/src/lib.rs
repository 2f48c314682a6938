//! Integration tests for Panier.
//!
//! The storefront router is driven in-process with `tower::ServiceExt::oneshot`;
//! no server or network is involved. [`TestClient`] carries the session cookie
//! from one request to the next, the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p panier-integration-tests
//! ```

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use panier_core::{CheckoutPolicy, UserDetails};
use panier_storefront::catalog::{Catalog, Product};
use panier_storefront::config::StorefrontConfig;
use panier_storefront::services::PaymentHandlers;
use panier_storefront::state::AppState;
use rust_decimal::Decimal;
use tower::ServiceExt;

/// Products every test catalog carries.
///
/// Ids 1 and 2 reproduce the 250 / 7 / 257 cart; id 3 is above the free
/// shipping threshold on its own.
#[must_use]
pub fn test_catalog() -> Catalog {
    let product = |id: i32, name: &str, price: i64| Product {
        id: id.into(),
        name: name.to_string(),
        price: Decimal::new(price, 0),
        image: String::new(),
    };
    Catalog::from_products(vec![
        product(1, "Olive wood serving board", 100),
        product(2, "Ceramic bowl", 50),
        product(3, "Kilim floor rug", 600),
    ])
    .unwrap_or_else(|e| panic!("test catalog must be valid: {e}"))
}

/// Default configuration with the given checkout policy.
#[must_use]
pub fn test_config(policy: CheckoutPolicy) -> StorefrontConfig {
    let mut config = StorefrontConfig::from_lookup(|_| None).unwrap_or_else(|e| {
        panic!("default configuration must load: {e}");
    });
    config.checkout = policy;
    config
}

/// A valid customer details record.
#[must_use]
pub fn valid_details() -> UserDetails {
    UserDetails {
        first_name: "Amira".to_string(),
        last_name: "Ben Salah".to_string(),
        phone: "+21620123456".to_string(),
        email: "amira@example.tn".to_string(),
        address: "15 Rue de Marseille".to_string(),
        country: "Tunisia".to_string(),
        zip_code: "10001".to_string(),
    }
}

/// Form fields for a details record, under the form's camelCase names.
#[must_use]
pub fn details_form(details: &UserDetails) -> Vec<(&'static str, String)> {
    vec![
        ("firstName", details.first_name.clone()),
        ("lastName", details.last_name.clone()),
        ("phone", details.phone.clone()),
        ("email", details.email.clone()),
        ("address", details.address.clone()),
        ("country", details.country.clone()),
        ("zipCode", details.zip_code.clone()),
    ]
}

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A header value as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", self.body))
    }
}

/// Drives the storefront router for one visitor.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// A client for a fresh storefront with the given checkout policy.
    #[must_use]
    pub fn new(policy: CheckoutPolicy) -> Self {
        let state = AppState::new(test_config(policy), test_catalog(), PaymentHandlers::stubs());
        Self {
            router: panier_storefront::app(state),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, with no session yet.
    #[must_use]
    pub fn another_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// `GET` a path.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty());
        self.send(request).await
    }

    /// `POST` a urlencoded form, as a plain browser submission.
    pub async fn post_form<K, V>(&mut self, path: &str, fields: &[(K, V)]) -> TestResponse
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = self.form_request(path, fields, false);
        self.send(request).await
    }

    /// `POST` a urlencoded form the way HTMX sends it.
    pub async fn htmx_post_form<K, V>(&mut self, path: &str, fields: &[(K, V)]) -> TestResponse
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = self.form_request(path, fields, true);
        self.send(request).await
    }

    /// The checkout snapshot from `GET /api/checkout`.
    pub async fn snapshot(&mut self) -> serde_json::Value {
        let response = self.get("/api/checkout").await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    fn form_request<K, V>(
        &self,
        path: &str,
        fields: &[(K, V)],
        htmx: bool,
    ) -> Result<Request<Body>, axum::http::Error>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
            .finish();
        let mut builder = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        builder.body(Body::from(body))
    }

    async fn send(&mut self, request: Result<Request<Body>, axum::http::Error>) -> TestResponse {
        let request = request.unwrap_or_else(|e| panic!("invalid test request: {e}"));
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});
        self.keep_cookie(&response);

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn keep_cookie(&mut self, response: &Response<Body>) {
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with("panier_session="));
        if let Some(pair) = session_cookie {
            self.cookie = Some(pair.to_string());
        }
    }
}
