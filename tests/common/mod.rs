// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::extract::Json;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use keyshop::config::Config;
use keyshop::db::FirestoreDb;
use keyshop::middleware::auth::{create_session_jwt, AuthUser};
use keyshop::routes::create_router;
use keyshop::services::IdentityClient;
use keyshop::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore emulator connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app on the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_frontend_url("http://localhost:5173")
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_test_app_with_config(config)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let identity = IdentityClient::from_config(&config);
    let state = Arc::new(AppState {
        config,
        db: FirestoreDb::new_in_memory(),
        identity,
    });

    (create_router(state.clone()), state)
}

/// Session token for a test user.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    let user = AuthUser {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        id_token: "provider-id-token".to_string(),
    };
    create_session_jwt(&user, signing_key).expect("Failed to create JWT")
}

/// `Authorization` header value for a test user.
#[allow(dead_code)]
pub fn bearer(state: &AppState, uid: &str) -> String {
    format!(
        "Bearer {}",
        create_test_jwt(uid, &state.config.session_signing_key)
    )
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body is not JSON")
}

/// Password the identity stub accepts for every account.
#[allow(dead_code)]
pub const STUB_PASSWORD: &str = "hunter22";

/// Start a local stand-in for the Firebase Auth REST API.
///
/// `accounts:signInWithPassword` accepts any email with `STUB_PASSWORD`
/// and uses the part before `@` as the user id. `accounts:update` accepts
/// any token except `"stale"`. Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_identity_stub() -> String {
    async fn provider(uri: Uri, Json(body): Json<serde_json::Value>) -> Response {
        let provider_error = |message: &str| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": { "code": 400, "message": message } })),
            )
                .into_response()
        };

        if uri.path().ends_with("accounts:signInWithPassword") {
            let email = body["email"].as_str().unwrap_or_default().to_string();
            if body["password"] != STUB_PASSWORD {
                return provider_error("INVALID_LOGIN_CREDENTIALS");
            }
            let local_id = email.split('@').next().unwrap_or_default().to_string();
            Json(serde_json::json!({
                "localId": local_id,
                "email": email,
                "idToken": format!("id-token-{}", local_id),
            }))
            .into_response()
        } else if uri.path().ends_with("accounts:update") {
            if body["idToken"] == "stale" {
                return provider_error("CREDENTIAL_TOO_OLD_LOGIN_AGAIN");
            }
            Json(serde_json::json!({
                "localId": "stub-user",
                "email": body["email"],
                "idToken": "id-token-refreshed",
            }))
            .into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind identity stub");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, axum::Router::new().fallback(provider))
            .await
            .ok();
    });

    format!("http://{}/v1", addr)
}
