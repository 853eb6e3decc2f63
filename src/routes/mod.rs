// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.
//!
//! Three groups share one router:
//! - storefront reads and sign-in, open to everyone
//! - cart, orders, account and admin API, behind `require_auth`
//! - named pages, behind the navigation guard

pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod pages;

use crate::config::StoreBackend;
use crate::middleware::{guard::guard_navigation, require_auth, security::add_security_headers};
use crate::AppState;
use axum::extract::State;
use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
    /// "firestore" or "memory"
    pub store: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = match state.config.store_backend {
        StoreBackend::Firestore => "firestore",
        StoreBackend::Memory => "memory",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id: option_env!("BUILD_ID").unwrap_or("unknown").to_string(),
        store: store.to_string(),
    })
}

/// Credentialed CORS for the storefront frontend, plus localhost for development.
fn cors_layer(frontend_url: String) -> CorsLayer {
    let allowed = move |origin: &HeaderValue, _: &Parts| {
        let origin = origin.to_str().unwrap_or("");
        origin == frontend_url
            || origin.starts_with("http://localhost")
            || origin.starts_with("http://127.0.0.1")
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let storefront = Router::new()
        .route("/health", get(health_check))
        .merge(catalog::routes())
        .merge(auth::routes());

    let signed_in = api::routes()
        .merge(admin::routes())
        .merge(auth::session_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let pages = pages::routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), guard_navigation));

    Router::new()
        .merge(storefront)
        .merge(signed_in)
        .merge(pages)
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors_layer(state.config.frontend_url.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
