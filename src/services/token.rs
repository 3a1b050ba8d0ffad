// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless session tokens.
//!
//! Two JWT flavors with independent secrets and lifetimes: a short-lived
//! access token verified on every API request, and a long-lived refresh
//! token scoped to the refresh cookie. Both are bound to a fixed
//! issuer/audience pair that must match on verification, so a token from
//! another deployment of the same code is rejected.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

const TOKEN_ISSUER: &str = "skycast";
const TOKEN_AUDIENCE: &str = "skycast-client";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (internal user id)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Verified token contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    pub user_id: Uuid,
    pub email: String,
}

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

/// Mints and verifies access/refresh token pairs.
///
/// Holds its secrets and lifetimes as immutable fields; construct once at
/// startup and share through `AppState`.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_ttl: chrono::Duration,
        refresh_ttl: chrono::Duration,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mint a short-lived access token for a user.
    pub fn issue_access_token(&self, user: &User) -> anyhow::Result<String> {
        self.sign(user, &self.access_secret, self.access_ttl)
    }

    /// Mint a long-lived refresh token for a user.
    pub fn issue_refresh_token(&self, user: &User) -> anyhow::Result<String> {
        self.sign(user, &self.refresh_secret, self.refresh_ttl)
    }

    /// Verify an access token and return its payload.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        verify(token, &self.access_secret)
    }

    /// Verify a refresh token and return its payload.
    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        verify(token, &self.refresh_secret)
    }

    fn sign(
        &self,
        user: &User,
        secret: &str,
        ttl: chrono::Duration,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }
}

fn verify(token: &str, secret: &str) -> Result<TokenPayload, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    let user_id = data.claims.sub.parse().map_err(|_| TokenError::Invalid)?;

    Ok(TokenPayload {
        user_id,
        email: data.claims.email,
    })
}
