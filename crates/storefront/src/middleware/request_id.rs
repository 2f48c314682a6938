//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id`. An id supplied by an upstream
//! proxy is reused when it looks sane; otherwise a UUID v4 is generated.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound id accepted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse an inbound id only if it is short and made of visible ASCII.
fn accept_inbound(value: &str) -> Option<&str> {
    (!value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic()))
    .then_some(value)
}

/// Middleware that ensures every request has a request ID.
///
/// The id is recorded on the `http_request` span, set as a Sentry tag, and
/// echoed in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_inbound)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn request_id_for(inbound: Option<&str>) -> String {
        let mut request = axum::http::Request::builder().uri("/");
        if let Some(id) = inbound {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_generates_uuid() {
        let id = request_id_for(None).await;
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_reuses_upstream_id() {
        assert_eq!(request_id_for(Some("cf-8a1b2c")).await, "cf-8a1b2c");
    }

    #[tokio::test]
    async fn test_replaces_oversized_id() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let id = request_id_for(Some(&long)).await;
        assert_ne!(id, long);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_accept_inbound() {
        assert_eq!(accept_inbound("abc-123"), Some("abc-123"));
        assert_eq!(accept_inbound(""), None);
        assert_eq!(accept_inbound("has space"), None);
    }
}
