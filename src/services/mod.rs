// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod geocoding;
pub mod oauth;
pub mod token;
pub mod weather;

pub use geocoding::{GeocodingClient, GeocodingProvider};
pub use oauth::{GoogleOauth, GoogleProfile};
pub use token::{TokenError, TokenPayload, TokenService};
pub use weather::WeatherClient;
