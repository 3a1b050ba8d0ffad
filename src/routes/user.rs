// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and saved-locations routes for authenticated users.
//!
//! The auth middleware is applied in routes/mod.rs for these routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::user::{SavedLocation, TempUnit, User, WindUnit};
use crate::routes::MessageResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/me", get(get_me).put(update_me))
        .route("/api/user/locations", get(get_locations).post(add_location))
        .route("/api/user/locations/{id}", delete(remove_location))
}

/// Envelope for user responses.
#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Get current user profile.
async fn get_me(Extension(user): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse { user: user.0 })
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    temp_unit: Option<TempUnit>,
    wind_unit: Option<WindUnit>,
}

/// Update profile fields and unit preferences.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(updates): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    updates
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let row = state
        .db
        .update_profile(
            user.0.id,
            updates.name.as_deref(),
            updates.temp_unit,
            updates.wind_unit,
        )
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse {
        user: row.into_user(),
    }))
}

#[derive(Serialize)]
struct LocationsResponse {
    locations: Vec<SavedLocation>,
}

/// Get saved locations.
async fn get_locations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<LocationsResponse>> {
    let locations = state
        .db
        .get_saved_locations(user.0.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(LocationsResponse { locations }))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AddLocationRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    lon: f64,
    #[serde(default)]
    is_default: Option<bool>,
}

#[derive(Serialize)]
struct LocationResponse {
    location: SavedLocation,
}

/// Add a saved location.
async fn add_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<AddLocationRequest>,
) -> Result<(StatusCode, Json<LocationResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut locations = state
        .db
        .get_saved_locations(user.0.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    // A new default displaces any existing one.
    if request.is_default == Some(true) {
        for location in &mut locations {
            location.is_default = Some(false);
        }
    }

    let location = SavedLocation {
        id: format!("loc_{}", Uuid::new_v4()),
        name: request.name,
        lat: request.lat,
        lon: request.lon,
        is_default: request.is_default,
    };

    locations.push(location.clone());
    state.db.set_saved_locations(user.0.id, &locations).await?;

    Ok((StatusCode::CREATED, Json(LocationResponse { location })))
}

/// Remove a saved location.
async fn remove_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let locations = state
        .db
        .get_saved_locations(user.0.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if !locations.iter().any(|location| location.id == id) {
        return Err(AppError::LocationNotFound);
    }

    let remaining: Vec<SavedLocation> = locations
        .into_iter()
        .filter(|location| location.id != id)
        .collect();

    state.db.set_saved_locations(user.0.id, &remaining).await?;

    Ok(Json(MessageResponse {
        message: "Location removed successfully".to_string(),
    }))
}
