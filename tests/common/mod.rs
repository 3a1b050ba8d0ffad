// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use skycast::config::Config;
use skycast::db::UserStore;
use skycast::models::user::{TempUnit, User, UserUnits, WindUnit};
use skycast::routes::create_router;
use skycast::services::{
    GeocodingClient, GeocodingProvider, GoogleOauth, TokenService, WeatherClient,
};
use skycast::AppState;
use std::sync::Arc;

/// Unroutable endpoint: connections are refused immediately, so tests
/// never reach the real provider APIs.
pub const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::default())
}

/// Create a test app with a caller-supplied config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = UserStore::new_mock();

    let tokens = TokenService::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    );

    let oauth = GoogleOauth::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_callback_url.clone(),
    )
    .with_base_urls(DEAD_UPSTREAM);

    let weather = WeatherClient::with_base_url(
        config.openweather_api_key.clone(),
        DEAD_UPSTREAM.to_string(),
    );

    let geocoding = GeocodingClient::new(
        GeocodingProvider::OpenWeather,
        None,
        config.openweather_api_key.clone(),
    )
    .with_base_urls(DEAD_UPSTREAM, DEAD_UPSTREAM);

    let state = Arc::new(AppState {
        config,
        db,
        tokens,
        oauth,
        weather,
        geocoding,
    });

    (create_router(state.clone()), state)
}

/// Token service issuing already-expired tokens with the test secrets.
#[allow(dead_code)]
pub fn expired_token_service(config: &Config) -> TokenService {
    TokenService::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        chrono::Duration::minutes(-5),
        chrono::Duration::minutes(-5),
    )
}

/// A user value for minting tokens; the id does not exist in any store.
#[allow(dead_code)]
pub fn test_user() -> User {
    User {
        id: uuid::Uuid::new_v4(),
        google_id: "g-test".to_string(),
        email: "user@example.com".to_string(),
        name: "User".to_string(),
        photo_url: String::new(),
        units: UserUnits {
            temp_unit: TempUnit::Celsius,
            wind_unit: WindUnit::Kph,
        },
        saved_locations: vec![],
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Collect and parse a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
