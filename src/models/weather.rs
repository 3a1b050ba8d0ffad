// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather and geocoding response shapes.

use serde::{Deserialize, Serialize};

/// Full weather payload for a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyWeather>,
    pub daily: Vec<DailyWeather>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aqi: Option<AirQuality>,
    pub location: LocationInfo,
}

/// Current conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temp: i32,
    pub feels_like: i32,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub humidity: i32,
    /// km/h
    pub wind_speed: i32,
    /// degrees
    pub wind_direction: i32,
    /// hPa
    pub pressure: i32,
    /// km
    pub visibility: i32,
    pub uv_index: i32,
    pub sunrise: String,
    pub sunset: String,
    pub last_updated: String,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyWeather {
    pub time: String,
    pub temp: i32,
    pub condition: String,
    pub icon: String,
    /// Probability of precipitation, percent
    pub precipitation: i32,
    pub wind_speed: i32,
}

/// Daily forecast entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWeather {
    pub date: String,
    pub temp_max: i32,
    pub temp_min: i32,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub precipitation: i32,
    pub humidity: i32,
    pub wind_speed: i32,
}

/// Air quality index and pollutant concentrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: i32,
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

/// Resolved place for a weather lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// City autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteResult {
    pub name: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
