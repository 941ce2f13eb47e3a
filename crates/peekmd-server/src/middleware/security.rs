//! Response headers for the preview page and its assets.
//!
//! The page embeds its own styles and scripts, loads mermaid from a CDN and
//! shows images from anywhere the document points to, so the policy allows
//! exactly that. Headers a handler already set are left alone, which keeps
//! the long-lived cache policy of proxied assets.

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
                                       script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
                                       style-src 'self' 'unsafe-inline'; \
                                       img-src 'self' data: http: https:; \
                                       connect-src 'self'; \
                                       frame-ancestors 'none'";

/// Header names and values added to every response that lacks them.
pub(crate) const PREVIEW_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    // The page is rendered per request and must not be served stale
    ("cache-control", "no-store"),
];

/// Add [`PREVIEW_HEADERS`] to every response of `router`.
pub(crate) fn with_preview_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    PREVIEW_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}
