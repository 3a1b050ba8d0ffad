// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather lookup and city autocomplete.
//!
//! Both routes run behind `optional_auth`: anonymous callers are served
//! a reduced weather payload, authenticated callers the full one.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::MaybeUser;
use crate::models::weather::{AutocompleteResult, WeatherData};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/weather", get(get_weather))
        .route("/api/autocomplete", get(autocomplete))
}

#[derive(Deserialize)]
struct WeatherQuery {
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Get weather data for a city name or coordinate pair.
async fn get_weather(
    State(state): State<Arc<AppState>>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherData>> {
    let (lat, lon) = match query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => state.geocoding.geocode_city(city).await?,
        None => match (query.lat, query.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(AppError::BadRequest(
                    "Either city or lat/lon coordinates are required".to_string(),
                ))
            }
        },
    };

    let data = state
        .weather
        .get_weather_data(lat, lon, user.is_some())
        .await?;

    Ok(Json(data))
}

#[derive(Deserialize)]
struct AutocompleteQuery {
    query: String,
}

#[derive(Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<AutocompleteResult>,
}

/// Autocomplete city names.
async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteQuery>,
) -> Result<Json<SuggestionsResponse>> {
    let query = params.query.trim();
    if query.len() < 2 || query.len() > 100 {
        return Err(AppError::BadRequest(
            "Query must be between 2 and 100 characters".to_string(),
        ));
    }

    let suggestions = state.geocoding.search_cities(query).await;

    Ok(Json(SuggestionsResponse { suggestions }))
}
