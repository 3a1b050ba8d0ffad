// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.
//!
//! Two per-request gates over the same extraction/verification path:
//! `auth_guard` rejects with a coded 401/404, `optional_auth` swallows
//! every failure and lets the request continue anonymous. Both verify
//! the token exactly once and hit the store at most once.

use crate::error::AppError;
use crate::models::User;
use crate::services::TokenError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user attached to the request context.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Identity attached by `optional_auth`: present on every request that
/// passes through it, `None` inside when the caller is anonymous.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<User>);

/// Middleware that requires a valid access token.
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Middleware that attaches a user when a valid token is present, but
/// never fails the request.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match authenticate(&state, request.headers()).await {
        Ok(user) => MaybeUser(Some(user)),
        Err(err) => {
            // Silently fail for optional auth.
            tracing::debug!(error = %err, "Optional auth failed, continuing as anonymous");
            MaybeUser(None)
        }
    };
    request.extensions_mut().insert(identity);

    next.run(request).await
}

/// Extract the bearer token, verify it, and load the user.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::NoToken)?;

    let token = auth_header.strip_prefix("Bearer ").ok_or(AppError::NoToken)?;

    let payload = state
        .tokens
        .verify_access_token(token)
        .map_err(|err| match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid => AppError::InvalidToken,
        })?;

    let row = state
        .db
        .get_user(payload.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(row.into_user())
}
