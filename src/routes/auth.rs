// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.
//!
//! Login lifecycle: redirect to the consent screen, handle the provider
//! callback (mint the access/refresh pair, set the refresh cookie),
//! refresh the access token, and log out. The callback leg is a browser
//! navigation, so every failure there resolves to a redirect instead of
//! a JSON error.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::routes::MessageResponse;
use crate::services::TokenError;
use crate::AppState;

/// Name of the HTTP-only refresh token cookie.
pub const REFRESH_COOKIE: &str = "refreshToken";

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// Start OAuth flow - redirect to the Google consent screen.
async fn auth_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.oauth_state_key)?;
    let auth_url = state.oauth.authorize_url(&oauth_state);

    tracing::info!("Starting OAuth flow, redirecting to Google");

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for an identity, create the session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    match run_callback(&state, params).await {
        Ok((access_token, refresh_token)) => {
            let cookie = refresh_cookie(&state.config, refresh_token);
            // The access token rides in the URL fragment so it never
            // reaches a server log on the next navigation.
            let redirect_url = format!(
                "{}/#/auth/success?token={}",
                state.config.frontend_url, access_token
            );
            (jar.add(cookie), Redirect::temporary(&redirect_url))
        }
        Err(err) => {
            tracing::warn!(error = %err, "OAuth callback failed");
            let redirect_url = format!("{}/#/auth/error", state.config.frontend_url);
            (jar, Redirect::temporary(&redirect_url))
        }
    }
}

/// The fallible part of the callback; the handler turns any error into
/// an error-page redirect.
async fn run_callback(
    state: &Arc<AppState>,
    params: CallbackParams,
) -> Result<(String, String)> {
    if let Some(error) = params.error {
        return Err(AppError::Upstream(format!(
            "Provider returned error: {}",
            error
        )));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::BadRequest("Missing state parameter".to_string()))?;
    if !verify_state(&oauth_state, &state.config.oauth_state_key) {
        return Err(AppError::BadRequest(
            "Invalid or tampered state parameter".to_string(),
        ));
    }

    let profile = state.oauth.exchange_code(&code).await?;
    let user = state.oauth.login_or_create(&state.db, profile).await?;

    tracing::info!(user_id = %user.id, "OAuth successful");

    let access_token = state.tokens.issue_access_token(&user)?;
    let refresh_token = state.tokens.issue_refresh_token(&user)?;

    Ok((access_token, refresh_token))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    user: User,
}

/// Mint a new access token from a refresh token.
///
/// The token comes from the request body or the cookie; the body wins
/// when both are present. The refresh token itself is not rotated.
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: axum::body::Bytes,
) -> Result<Json<RefreshResponse>> {
    // The body is optional; anything that doesn't parse as the refresh
    // shape is treated as absent and the cookie is consulted instead.
    let body_token = serde_json::from_slice::<RefreshRequest>(&body)
        .ok()
        .and_then(|req| req.refresh_token);
    let cookie_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    let refresh_token = body_token
        .or(cookie_token)
        .ok_or(AppError::NoRefreshToken)?;

    let payload = state
        .tokens
        .verify_refresh_token(&refresh_token)
        .map_err(|err| match err {
            TokenError::Expired => AppError::RefreshTokenExpired,
            TokenError::Invalid => AppError::InvalidRefreshToken,
        })?;

    // Re-read the user so the response carries fresh data; only the
    // subject id from the token payload is trusted.
    let user = state
        .db
        .get_user(payload.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?
        .into_user();

    let access_token = state.tokens.issue_access_token(&user)?;

    Ok(Json(RefreshResponse { access_token, user }))
}

/// Logout - clear the refresh cookie.
///
/// Outstanding access tokens stay valid until they expire; there is no
/// server-side token state to invalidate.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(clear_refresh_cookie(&state.config)),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

// ─── Cookies ─────────────────────────────────────────────────

/// Build the refresh-token cookie with its full attribute set.
fn refresh_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.production)
        .max_age(time::Duration::seconds(
            config.refresh_token_ttl.num_seconds(),
        ))
        .build()
}

/// Removal cookie with the same attributes as the one it clears.
fn clear_refresh_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.production)
        .max_age(time::Duration::ZERO)
        .build()
}

// ─── OAuth state parameter ───────────────────────────────────

/// Sign a timestamp payload for the OAuth state parameter.
///
/// Format before base64: "timestamp_hex|signature_hex".
fn sign_state(secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{:x}", timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature on the OAuth state parameter.
fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(state) else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };

    let Some((payload, signature_hex)) = state_str.split_once('|') else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let secret = b"secret_key";
        let state = sign_state(secret).unwrap();
        assert!(verify_state(&state, secret));
    }

    #[test]
    fn test_state_wrong_secret() {
        let secret = b"secret_key";
        let state = sign_state(secret).unwrap();
        assert!(!verify_state(&state, b"wrong_key"));
    }

    #[test]
    fn test_state_tampered_payload() {
        let secret = b"secret_key";
        let state = sign_state(secret).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&state).unwrap()).unwrap();
        let (_, signature) = decoded.split_once('|').unwrap();
        let forged = format!("deadbeef|{}", signature);
        let forged = URL_SAFE_NO_PAD.encode(forged.as_bytes());
        assert!(!verify_state(&forged, secret));
    }

    #[test]
    fn test_state_malformed() {
        let secret = b"secret_key";
        assert!(!verify_state("not-base64!!!", secret));
        assert!(!verify_state(
            &URL_SAFE_NO_PAD.encode("no-separator"),
            secret
        ));
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = Config::default();
        let cookie = refresh_cookie(&config, "tok".to_string());
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("refreshToken=tok"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_refresh_cookie_secure_in_production() {
        let config = Config {
            production: true,
            ..Config::default()
        };
        let cookie = refresh_cookie(&config, "tok".to_string());
        assert!(cookie.to_string().contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_matches_set_attributes() {
        let config = Config::default();
        let set = refresh_cookie(&config, "tok".to_string());
        let clear = clear_refresh_cookie(&config);

        assert_eq!(set.path(), clear.path());
        assert_eq!(set.http_only(), clear.http_only());
        assert_eq!(set.same_site(), clear.same_site());
        assert_eq!(set.secure(), clear.secure());
        assert_eq!(clear.max_age(), Some(time::Duration::ZERO));
    }
}
