// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Auth REST client for email/password accounts.
//!
//! Handles:
//! - Sign-in with email and password
//! - Email and password changes for the signed-in account

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Account returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    pub local_id: String,
    pub email: String,
    pub id_token: String,
}

impl From<SignedInUser> for AuthUser {
    fn from(user: SignedInUser) -> Self {
        AuthUser {
            uid: user.local_id,
            email: user.email,
            id_token: user.id_token,
        }
    }
}

/// Response of `accounts:update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Fresh ID token, issued when the email or password changed
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.identity_api_url, &config.firebase.api_key)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedInUser, AppError> {
        self.post_json(
            "accounts:signInWithPassword",
            &SignInRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Change the email of the account behind `id_token`.
    pub async fn update_email(&self, id_token: &str, email: &str) -> Result<AccountUpdate, AppError> {
        self.post_json(
            "accounts:update",
            &UpdateRequest {
                id_token,
                email: Some(email),
                password: None,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Change the password of the account behind `id_token`.
    pub async fn update_password(
        &self,
        id_token: &str,
        password: &str,
    ) -> Result<AccountUpdate, AppError> {
        self.post_json(
            "accounts:update",
            &UpdateRequest {
                id_token,
                email: None,
                password: Some(password),
                return_secure_token: true,
            },
        )
        .await
    }

    /// Update the signed-in user's email, then the password if one is given.
    ///
    /// Returns the user with the new email and the freshest ID token the
    /// provider handed back. Failures are logged and reported as `None`,
    /// never returned as errors.
    pub async fn update_user_info(
        &self,
        user: &AuthUser,
        email: &str,
        password: Option<&str>,
    ) -> Option<AuthUser> {
        let result = async {
            let updated = self.update_email(&user.id_token, email).await?;
            let mut refreshed = AuthUser {
                uid: user.uid.clone(),
                email: updated.email.unwrap_or_else(|| email.to_string()),
                id_token: updated.id_token.unwrap_or_else(|| user.id_token.clone()),
            };

            if let Some(password) = password {
                let updated = self.update_password(&refreshed.id_token, password).await?;
                if let Some(id_token) = updated.id_token {
                    refreshed.id_token = id_token;
                }
            }
            Ok::<_, AppError>(refreshed)
        }
        .await;

        match result {
            Ok(refreshed) => {
                tracing::info!(uid = %user.uid, "User information updated");
                Some(refreshed)
            }
            Err(e) => {
                tracing::error!(uid = %user.uid, error = %e, "Error updating user information");
                None
            }
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))
    }
}

/// Map an identity provider error response to an application error.
fn classify_provider_error(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

    // Messages may carry a suffix, e.g. "WEAK_PASSWORD : Password should be..."
    let code = message
        .split(" : ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AppError::Unauthorized
        }
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            AppError::InvalidToken
        }
        "EMAIL_EXISTS" | "INVALID_EMAIL" | "WEAK_PASSWORD" => AppError::BadRequest(message),
        _ => AppError::Identity(message),
    }
}
