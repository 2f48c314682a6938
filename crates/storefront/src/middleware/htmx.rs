//! HTMX request detection.

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header HTMX sets on every request it issues.
pub const HX_REQUEST_HEADER: &str = "hx-request";

/// Whether the request came from HTMX rather than a plain form post.
///
/// HTMX requests get a fragment back; plain posts get redirected to the
/// full page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        Ok(Self(is_htmx))
    }
}
