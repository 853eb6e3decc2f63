// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Path prefixes whose responses carry per-user data.
const PRIVATE_PREFIXES: &[&str] = &["/api/", "/auth/"];

/// Add security headers to all responses; mark per-user responses uncacheable.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let private = PRIVATE_PREFIXES
        .iter()
        .any(|prefix| req.uri().path().starts_with(prefix));

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if private {
        headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::{routing::get, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route("/catalog", get(|| async { "catalog" }))
            .route("/api/cart", get(|| async { "cart" }))
            .layer(axum::middleware::from_fn(add_security_headers))
    }

    #[tokio::test]
    async fn test_security_headers_on_public_page() {
        let response = app()
            .oneshot(Request::builder().uri("/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert!(headers.get("Cache-Control").is_none());
    }

    #[tokio::test]
    async fn test_private_responses_not_cached() {
        let response = app()
            .oneshot(Request::builder().uri("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    }
}
