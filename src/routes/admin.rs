// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin panel routes: catalog CRUD and dashboard counters.
//!
//! Any signed-in user may call these; the auth middleware is applied in
//! routes/mod.rs.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Achievement, Genre, LicenseKey, Product, Record};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/achievements", get(get_achievements))
        .route("/api/admin/sales", get(get_sales))
        .route("/api/admin/genres", get(list_genres).post(create_genre))
        .route("/api/admin/genres/{id}", put(update_genre).delete(delete_genre))
        .route("/api/admin/products", axum::routing::post(create_product))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/keys", get(list_keys).post(create_key))
        .route("/api/admin/keys/{id}", put(update_key).delete(delete_key))
}

// ─── Request Bodies ──────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct GenreInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub descr: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

impl From<ProductInput> for Product {
    fn from(input: ProductInput) -> Self {
        Product {
            name: input.name,
            descr: input.descr,
            image: input.image,
            price: input.price,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewKeyInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1, max = 256))]
    pub key: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct KeyInput {
    #[validate(length(min = 1, max = 256))]
    pub key: String,
}

// ─── Dashboard ───────────────────────────────────────────────

async fn get_achievements(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Achievement>>> {
    Ok(Json(state.db.fetch_achievements().await?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SalesResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub sales: usize,
}

async fn get_sales(State(state): State<Arc<AppState>>) -> Result<Json<SalesResponse>> {
    let sales = state.db.fetch_sales().await?;
    Ok(Json(SalesResponse { sales }))
}

// ─── Genres ──────────────────────────────────────────────────

async fn list_genres(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record<Genre>>>> {
    Ok(Json(state.db.fetch_genres().await?))
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<GenreInput>,
) -> Result<(StatusCode, Json<Record<Genre>>)> {
    input.validate()?;
    let genre = state.db.add_genre(&input.name).await?;
    tracing::info!(uid = %user.uid, genre_id = %genre.id, "Genre created");
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<GenreInput>,
) -> Result<StatusCode> {
    input.validate()?;
    state
        .db
        .update_genre(&Record::new(id, Genre { name: input.name }))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_genre(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Products ────────────────────────────────────────────────

async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Record<Product>>)> {
    input.validate()?;
    let product = state.db.add_product(&input.into()).await?;
    tracing::info!(uid = %user.uid, product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<StatusCode> {
    input.validate()?;
    state
        .db
        .update_product(&Record::new(id, input.into()))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── License Keys ────────────────────────────────────────────

async fn list_keys(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record<LicenseKey>>>> {
    Ok(Json(state.db.fetch_keys().await?))
}

async fn create_key(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewKeyInput>,
) -> Result<(StatusCode, Json<Record<LicenseKey>>)> {
    input.validate()?;
    let key = state.db.add_key(&input.product_id, &input.key).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

async fn update_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<KeyInput>,
) -> Result<StatusCode> {
    input.validate()?;
    state.db.update_key(&id, &input.key).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_key(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
