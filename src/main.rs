// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Skycast API Server
//!
//! Thin backend for the weather dashboard: Google OAuth + JWT sessions,
//! user preferences in Postgres, and OpenWeather/geocoding proxying.

use skycast::{
    config::Config,
    db::UserStore,
    services::{GeocodingClient, GoogleOauth, TokenService, WeatherClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment; any missing or malformed
    // value is fatal before the listener binds.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Environment validation failed");
            std::process::exit(1);
        }
    };
    tracing::info!(port = config.port, "Starting Skycast API");

    // Connect to Postgres and apply migrations
    let db = UserStore::connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

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
    );

    let weather = WeatherClient::new(config.openweather_api_key.clone());

    let geocoding = GeocodingClient::new(
        config.geocoding_provider,
        config.geocoding_api_key.clone(),
        config.openweather_api_key.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        tokens,
        oauth,
        weather,
        geocoding,
    });

    // Build router
    let app = skycast::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skycast=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
