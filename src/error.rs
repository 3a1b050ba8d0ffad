// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every client-facing failure carries a stable machine-readable `code`
//! string alongside the HTTP status, so the frontend can branch on the
//! code instead of parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Access token required")]
    NoToken,

    #[error("Access token expired")]
    TokenExpired,

    #[error("Invalid access token")]
    InvalidToken,

    #[error("Refresh token required")]
    NoRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Location not found")]
    LocationNotFound,

    #[error("City not found")]
    CityNotFound,

    #[error("Failed to find location")]
    GeocodingFailed,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("Invalid weather API key")]
    InvalidApiKey,

    #[error("Weather service unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NoToken => "NO_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::NoRefreshToken => "NO_REFRESH_TOKEN",
            AppError::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            AppError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::LocationNotFound => "LOCATION_NOT_FOUND",
            AppError::CityNotFound => "CITY_NOT_FOUND",
            AppError::GeocodingFailed => "GEOCODING_FAILED",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::RateLimited => "RATE_LIMIT_EXCEEDED",
            AppError::InvalidApiKey => "INVALID_API_KEY",
            AppError::WeatherUnavailable(_) => "WEATHER_SERVICE_ERROR",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NoToken
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::NoRefreshToken
            | AppError::RefreshTokenExpired
            | AppError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::LocationNotFound
            | AppError::CityNotFound
            | AppError::GeocodingFailed => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::WeatherUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidApiKey | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (error, details) = match &self {
            AppError::BadRequest(msg) => ("Invalid request".to_string(), Some(msg.clone())),
            AppError::WeatherUnavailable(msg) => {
                tracing::warn!(error = %msg, "Weather provider failure");
                ("Weather service unavailable".to_string(), None)
            }
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream provider error");
                ("Upstream provider error".to_string(), None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Internal server error".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                // Underlying message is only exposed outside release builds.
                let details = if cfg!(debug_assertions) {
                    Some(err.to_string())
                } else {
                    None
                };
                ("Internal server error".to_string(), details)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error,
            code: self.code().to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
