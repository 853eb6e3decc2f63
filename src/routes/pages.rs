// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Named page routes.
//!
//! Each page answers with a descriptor the view layer renders from. The
//! navigation guard is applied in routes/mod.rs.

use crate::middleware::auth::AuthUser;
use crate::middleware::guard::{PageContext, ROUTES};
use crate::routes::auth::SessionUser;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    ROUTES.iter().fold(Router::new(), |router, route| {
        router.route(&route.axum_path(), get(render_page))
    })
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PageResponse {
    /// Route name, e.g. "product-details"
    pub route: String,
    pub params: BTreeMap<String, String>,
    pub user: Option<SessionUser>,
}

async fn render_page(
    Extension(page): Extension<PageContext>,
    user: Option<Extension<AuthUser>>,
) -> Json<PageResponse> {
    Json(PageResponse {
        route: page.route.name.to_string(),
        params: page.params,
        user: user.map(|Extension(user)| SessionUser::from(&user)),
    })
}
