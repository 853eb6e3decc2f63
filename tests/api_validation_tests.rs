// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use keyshop::config::Config;
use keyshop::AppState;
use tower::ServiceExt;

mod common;

fn json_request(method: &str, uri: &str, state: &AppState, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, common::bearer(state, "admin"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/products",
            &state,
            serde_json::json!({ "name": "Cheap", "price": -1.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.db.fetch_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_genre_name_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/genres",
            &state,
            serde_json::json!({ "name": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_empty_key_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/keys",
            &state,
            serde_json::json!({ "productId": "p1", "key": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_of_missing_genre_is_404() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/admin/genres/ghost",
            &state,
            serde_json::json!({ "name": "Horror" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_unknown_product_to_cart_is_404() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/cart",
            &state,
            serde_json::json!({ "productId": "missing" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_me_rejects_bad_email() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/me",
            &state,
            serde_json::json!({ "email": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_me_rejects_short_password() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/me",
            &state,
            serde_json::json!({ "email": "new@example.com", "password": "abc" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_me_reports_success() {
    let mut config = Config::test_default();
    config.identity_api_url = common::spawn_identity_stub().await;
    let (app, state) = common::create_test_app_with_config(config);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/me",
            &state,
            serde_json::json!({ "email": "new@example.com", "password": "longenough" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["updated"], true);
}

#[tokio::test]
async fn test_update_me_swallows_provider_failure() {
    // Provider unreachable: the failure is logged and reported, not raised.
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/me",
            &state,
            serde_json::json!({ "email": "new@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["updated"], false);
}
