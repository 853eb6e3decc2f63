// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation guard tests over the named page routes.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use tower::ServiceExt;

mod common;

async fn navigate(uri: &str, authorization: Option<String>) -> Response {
    let (app, _) = common::create_test_app();
    let mut request = Request::builder().uri(uri);
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn assert_redirected_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_guarded_pages_redirect_without_identity() {
    for uri in ["/adminpanel", "/user/bob"] {
        let response = navigate(uri, None).await;
        assert_redirected_home(&response);
    }
}

#[tokio::test]
async fn test_invalid_token_counts_as_no_identity() {
    let response = navigate("/adminpanel", Some("Bearer not-a-jwt".to_string())).await;
    assert_redirected_home(&response);
}

#[tokio::test]
async fn test_guarded_page_with_identity() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/adminpanel")
                .header(header::AUTHORIZATION, common::bearer(&state, "admin"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["route"], "adminpanel");
    assert_eq!(body["user"]["uid"], "admin");
}

#[tokio::test]
async fn test_user_profile_params() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/user/bob")
                .header(header::AUTHORIZATION, common::bearer(&state, "bob"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["route"], "user-profile");
    assert_eq!(body["params"]["username"], "bob");
}

#[tokio::test]
async fn test_open_pages_proceed_without_identity() {
    for (uri, name) in [
        ("/", "home"),
        ("/catalog", "catalog"),
        ("/product/abc123", "product-details"),
        ("/order", "order"),
    ] {
        let response = navigate(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = common::body_json(response).await;
        assert_eq!(body["route"], name);
        assert!(body["user"].is_null());
    }
}

#[tokio::test]
async fn test_product_page_params() {
    let response = navigate("/product/xyz", None).await;
    let body = common::body_json(response).await;
    assert_eq!(body["params"]["id"], "xyz");
}

#[tokio::test]
async fn test_unknown_page_is_404() {
    let response = navigate("/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
