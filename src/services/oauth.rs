// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth bridge.
//!
//! Converts a completed authorization handshake into a local user:
//! exchange the code for provider tokens, fetch the OpenID profile, then
//! look up or create the matching `users` row.

use serde::Deserialize;

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::user::NewUser;
use crate::models::User;

const OAUTH_SCOPE: &str = "openid email profile";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOauth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

/// Verified external identity returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google account id (stable, unique)
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

impl GoogleOauth {
    /// Create a new client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            callback_url,
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
        }
    }

    /// Override provider endpoints (tests).
    pub fn with_base_urls(mut self, base: &str) -> Self {
        self.auth_url = format!("{base}/auth");
        self.token_url = format!("{base}/token");
        self.userinfo_url = format!("{base}/userinfo");
        self
    }

    /// Build the consent-screen URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(OAUTH_SCOPE),
            state,
        )
    }

    /// Exchange an authorization code for the user's OpenID profile.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Token exchange failed with {}: {}",
                status, body
            )));
        }

        let tokens: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed token response: {}", e)))?;

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Userinfo request failed with {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed userinfo response: {}", e)))
    }

    /// Look up the user for a verified profile, creating one on first login.
    ///
    /// Profile fields are written only at creation time; subsequent logins
    /// do not resync email/name/photo.
    pub async fn login_or_create(
        &self,
        store: &UserStore,
        profile: GoogleProfile,
    ) -> Result<User, AppError> {
        let row = match store.get_user_by_google_id(&profile.sub).await? {
            Some(row) => row,
            None => {
                let name = profile
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "User".to_string());
                store
                    .create_user(&NewUser {
                        google_id: profile.sub,
                        email: profile.email.unwrap_or_default(),
                        name,
                        photo_url: profile.picture.unwrap_or_default(),
                    })
                    .await?
            }
        };

        Ok(row.into_user())
    }
}
