// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyshop API Server
//!
//! Serves the game key storefront: catalog, carts, orders and the admin
//! panel, backed by Firestore and Firebase Authentication.

use keyshop::{
    config::{Config, StoreBackend},
    db::FirestoreDb,
    services::IdentityClient,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        project = %config.firebase.project_id,
        "Starting Keyshop API"
    );

    let db = match config.store_backend {
        StoreBackend::Firestore => FirestoreDb::new(&config.firebase.project_id).await?,
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on exit");
            FirestoreDb::new_in_memory()
        }
    };

    let identity = IdentityClient::from_config(&config);
    tracing::info!(url = %config.identity_api_url, "Identity client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
    });

    // Build router
    let app = keyshop::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keyshop=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
