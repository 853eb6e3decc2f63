// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: cart, orders and account.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CartItem, Order, Record};
use crate::routes::auth::start_session;
use crate::services::place_order;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/cart/{item_id}", delete(remove_from_cart))
        .route("/api/orders", get(get_orders).post(checkout))
        .route("/api/orders/stream", get(stream_orders))
        .route("/api/me", put(update_me))
}

// ─── Cart ────────────────────────────────────────────────────

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Record<CartItem>>>> {
    Ok(Json(state.db.fetch_cart(&user.uid).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<Record<CartItem>>)> {
    request.validate()?;

    let product = state
        .db
        .fetch_product(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", request.product_id)))?;

    let item = state.db.add_to_cart(&user.uid, &product).await?;
    tracing::debug!(uid = %user.uid, product_id = %product.id, "Added to cart");

    Ok((StatusCode::CREATED, Json(item)))
}

async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<StatusCode> {
    state.db.remove_from_cart(&user.uid, &item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClearCartResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub removed: usize,
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ClearCartResponse>> {
    let removed = state.db.clear_cart(&user.uid).await?;
    Ok(Json(ClearCartResponse { removed }))
}

// ─── Orders ──────────────────────────────────────────────────

async fn get_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Record<Order>>>> {
    Ok(Json(state.db.fetch_orders(&user.uid).await?))
}

/// Check out the current cart.
async fn checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<Record<Order>>)> {
    let order = place_order(&state.db, &user.uid).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Server-sent events carrying the full order list after every change.
async fn stream_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let orders = state.db.watch_orders(&user.uid).await?;
    tracing::debug!(uid = %user.uid, "Order stream opened");

    let events = stream::unfold((orders, true), |(mut orders, first)| async move {
        if !first && orders.changed().await.is_err() {
            return None;
        }

        let snapshot = orders.borrow_and_update().clone();
        let event = Event::default()
            .event("orders")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));

        Some((Ok(event), (orders, false)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// ─── Account ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: String,
    /// Provider minimum is 6 characters
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdateUserResponse {
    pub updated: bool,
}

/// Change the signed-in user's email and, optionally, password.
///
/// On success the session is reissued with the new email and the ID
/// token the provider returned, so later updates are not made with a
/// stale token.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<UpdateUserRequest>,
) -> Result<(CookieJar, Json<UpdateUserResponse>)> {
    request.validate()?;

    let refreshed = state
        .identity
        .update_user_info(&user, &request.email, request.password.as_deref())
        .await;

    match refreshed {
        Some(refreshed) => {
            let jar = start_session(&state, &headers, jar, &refreshed)?;
            Ok((jar, Json(UpdateUserResponse { updated: true })))
        }
        None => Ok((jar, Json(UpdateUserResponse { updated: false }))),
    }
}
