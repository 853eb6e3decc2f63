// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes.

use crate::error::{AppError, Result};
use crate::models::{Genre, Product, Record};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/genres", get(list_genres))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/keys/count", get(get_key_count))
}

async fn list_genres(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record<Genre>>>> {
    Ok(Json(state.db.fetch_genres().await?))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record<Product>>>> {
    Ok(Json(state.db.fetch_products().await?))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Record<Product>>> {
    state
        .db
        .fetch_product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}

/// Stock level for a product.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct KeyCountResponse {
    pub product_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: usize,
}

async fn get_key_count(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<KeyCountResponse>> {
    let count = state.db.fetch_key_count(&id).await?;
    Ok(Json(KeyCountResponse {
        product_id: id,
        count,
    }))
}
