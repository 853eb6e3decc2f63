// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie tests.
//!
//! These tests verify the cookie set on sign-in, its removal on logout for
//! localhost and production-style frontends, and that a cookie session is
//! accepted by the protected API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use keyshop::config::Config;
use keyshop::middleware::auth::{create_session_jwt, AuthUser, Claims};
use tower::ServiceExt;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

fn logout_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, "keyshop_token=test")
        .body(Body::empty())
        .unwrap()
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

async fn app_with_identity_stub(frontend_url: &str) -> axum::Router {
    let mut config = Config::test_default();
    config.identity_api_url = common::spawn_identity_stub().await;
    config.frontend_url = frontend_url.to_string();
    common::create_test_app_with_config(config).0
}

#[tokio::test]
async fn test_logout_cookie_removal_localhost_attributes() {
    let (app, _) = common::create_test_app_with_frontend_url("http://localhost:5173");

    let response = app.oneshot(logout_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookies = set_cookie_headers(&response);
    let token_cookie = find_cookie(&set_cookies, "keyshop_token");

    assert!(token_cookie.contains("Path=/"));
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("SameSite=Lax"));
    assert!(token_cookie.contains("Max-Age=0"));
    assert!(!token_cookie.contains("Secure"));
    assert!(!token_cookie.contains("Domain="));
}

#[tokio::test]
async fn test_logout_cookie_removal_production_domain_attributes() {
    let (app, _) = common::create_test_app_with_frontend_url("https://shop.example.com");

    let response = app.oneshot(logout_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookies = set_cookie_headers(&response);
    let token_cookie = find_cookie(&set_cookies, "keyshop_token");

    assert!(token_cookie.contains("Path=/"));
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("SameSite=Lax"));
    assert!(token_cookie.contains("Max-Age=0"));
    assert!(token_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = app_with_identity_stub("http://localhost:5173").await;

    let response = app
        .oneshot(login_request("alice@example.com", common::STUB_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = set_cookie_headers(&response);
    let token_cookie = find_cookie(&set_cookies, "keyshop_token");
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("SameSite=Lax"));
    assert!(token_cookie.contains("Max-Age=3600"));

    let body = common::body_json(response).await;
    assert_eq!(body["uid"], "alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = app_with_identity_stub("http://localhost:5173").await;

    let response = app
        .oneshot(login_request("alice@example.com", "wrong-password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_with_unreachable_provider_is_bad_gateway() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(login_request("alice@example.com", common::STUB_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(login_request("not-an-email", "whatever"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cookie_session_reaches_protected_api() {
    let app = app_with_identity_stub("http://localhost:5173").await;

    let login = app
        .clone()
        .oneshot(login_request("bob@example.com", common::STUB_PASSWORD))
        .await
        .unwrap();
    let token_cookie = find_cookie(&set_cookie_headers(&login), "keyshop_token");
    let cookie_pair = token_cookie.split(';').next().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::COOKIE, cookie_pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["uid"], "bob");
}

fn update_me_request(token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/api/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn session_token(uid: &str, id_token: &str, signing_key: &[u8]) -> String {
    let user = AuthUser {
        uid: uid.to_string(),
        email: "old@example.com".to_string(),
        id_token: id_token.to_string(),
    };
    create_session_jwt(&user, signing_key).unwrap()
}

#[tokio::test]
async fn test_account_update_reissues_session_cookie() {
    let mut config = Config::test_default();
    config.identity_api_url = common::spawn_identity_stub().await;
    let (app, state) = common::create_test_app_with_config(config);
    let key = state.config.session_signing_key.clone();
    let token = session_token("carol", "id-token-carol", &key);

    let response = app
        .oneshot(update_me_request(
            &token,
            serde_json::json!({ "email": "new@example.com", "password": "longenough" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = set_cookie_headers(&response);
    let token_cookie = find_cookie(&set_cookies, "keyshop_token");
    let value = token_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("keyshop_token="))
        .unwrap();

    let claims = decode::<Claims>(
        value,
        &DecodingKey::from_secret(&key),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.sub, "carol");
    assert_eq!(claims.email, "new@example.com");
    assert_eq!(claims.idt, "id-token-refreshed");

    let body = common::body_json(response).await;
    assert_eq!(body["updated"], true);
}

#[tokio::test]
async fn test_rejected_account_update_keeps_session() {
    let mut config = Config::test_default();
    config.identity_api_url = common::spawn_identity_stub().await;
    let (app, state) = common::create_test_app_with_config(config);
    let token = session_token("carol", "stale", &state.config.session_signing_key);

    let response = app
        .oneshot(update_me_request(
            &token,
            serde_json::json!({ "email": "new@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = common::body_json(response).await;
    assert_eq!(body["updated"], false);
}
