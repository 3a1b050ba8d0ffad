// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Skycast: weather dashboard API server
//!
//! This crate provides the backend API: Google OAuth login with
//! stateless JWT sessions, user preferences and saved locations in
//! Postgres, and a proxy over the OpenWeather/geocoding APIs.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::UserStore;
use services::{GeocodingClient, GoogleOauth, TokenService, WeatherClient};

/// Shared application state.
///
/// Services hold their configuration as immutable fields and are
/// constructed once at startup; handlers receive them through this
/// state instead of reaching for globals.
pub struct AppState {
    pub config: Config,
    pub db: UserStore,
    pub tokens: TokenService,
    pub oauth: GoogleOauth,
    pub weather: WeatherClient,
    pub geocoding: GeocodingClient,
}
