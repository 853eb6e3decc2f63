// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password sign-in and session routes.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, AuthUser, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;

/// Sign-in and sign-out (no session needed).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes that read the current session (auth middleware applied by the caller).
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Signed-in user as seen by the frontend.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
        }
    }
}

/// Cookies are `Secure` except when the frontend is served from localhost.
fn is_local(headers: &HeaderMap, frontend_url: &str) -> bool {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    host.starts_with("localhost")
        || host.starts_with("127.0.0.1")
        || frontend_url.starts_with("http://localhost")
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Add a session cookie for `user` to the jar, replacing any current one.
pub(crate) fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    jar: CookieJar,
    user: &AuthUser,
) -> Result<CookieJar> {
    let jwt = create_session_jwt(user, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let secure = !is_local(headers, &state.config.frontend_url);
    Ok(jar.add(session_cookie(jwt, secure)))
}

/// Sign in with the identity provider and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionUser>)> {
    request.validate()?;

    let signed_in = state
        .identity
        .sign_in(&request.email, &request.password)
        .await?;
    let user = AuthUser::from(signed_in);
    let jar = start_session(&state, &headers, jar, &user)?;

    tracing::info!(uid = %user.uid, "User signed in");

    Ok((jar, Json(SessionUser::from(&user))))
}

/// Drop the session cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    let secure = !is_local(&headers, &state.config.frontend_url);
    let removal = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();

    (jar.remove(removal), StatusCode::NO_CONTENT)
}

async fn me(Extension(user): Extension<AuthUser>) -> Json<SessionUser> {
    Json(SessionUser::from(&user))
}
