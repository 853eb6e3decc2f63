// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The Firebase project identifiers are the same fixed set a web client
//! would be initialized with; only the API key and the session signing
//! key are required.

use std::env;
use std::str::FromStr;

/// Default Firebase Auth REST endpoint.
pub const DEFAULT_IDENTITY_API_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase project identifiers.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key (public, sent with every identity request)
    pub api_key: String,
    pub auth_domain: String,
    /// Project ID, also used to address Firestore
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

/// Which document store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub firebase: FirebaseConfig,
    /// Base URL of the identity provider REST API
    pub identity_api_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    /// HS256 key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            firebase: FirebaseConfig {
                api_key: "test_api_key".to_string(),
                auth_domain: "test-project.firebaseapp.com".to_string(),
                project_id: "test-project".to_string(),
                storage_bucket: "test-project.firebasestorage.app".to_string(),
                messaging_sender_id: "0".to_string(),
                app_id: "1:0:web:test".to_string(),
            },
            identity_api_url: "http://127.0.0.1:9".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let project_id =
            env::var("FIREBASE_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

        let firebase = FirebaseConfig {
            api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            auth_domain: env::var("FIREBASE_AUTH_DOMAIN")
                .unwrap_or_else(|_| format!("{}.firebaseapp.com", project_id)),
            storage_bucket: env::var("FIREBASE_STORAGE_BUCKET")
                .unwrap_or_else(|_| format!("{}.firebasestorage.app", project_id)),
            messaging_sender_id: env::var("FIREBASE_MESSAGING_SENDER_ID").unwrap_or_default(),
            app_id: env::var("FIREBASE_APP_ID").unwrap_or_default(),
            project_id,
        };

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        Ok(Self {
            firebase,
            identity_api_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_API_URL.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
