// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenWeather API client.
//!
//! Fetches current conditions, the 3-hourly forecast, and air quality,
//! and assembles the dashboard payload. Anonymous callers get a reduced
//! payload with detail fields zeroed out.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::weather::{
    AirQuality, CurrentWeather, HourlyWeather, LocationInfo, WeatherData,
};
use crate::time_utils::{format_unix_rfc3339, format_utc_rfc3339};

/// Forecast slots returned to authenticated users (8 x 3h = 24h).
const HOURLY_SLOTS: usize = 8;

/// OpenWeather API client.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a new client against the production OpenWeather API.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openweathermap.org/data/2.5".to_string())
    }

    /// Create a client against a custom base URL (tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Fetch and assemble the weather payload for a coordinate pair.
    pub async fn get_weather_data(
        &self,
        lat: f64,
        lon: f64,
        authenticated: bool,
    ) -> Result<WeatherData, AppError> {
        let raw = self.current(lat, lon).await?;
        let current = map_current(&raw);
        let location = map_location(&raw);

        if !authenticated {
            return Ok(guest_payload(current, location));
        }

        let forecast = self.forecast(lat, lon).await?;
        let hourly = forecast
            .list
            .iter()
            .take(HOURLY_SLOTS)
            .map(map_hourly)
            .collect();

        // Air quality is best-effort; a failure degrades to no AQI card.
        let aqi = match self.air_quality(lat, lon).await {
            Ok(aqi) => aqi,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to get air quality data");
                None
            }
        };

        Ok(WeatherData {
            current,
            hourly,
            // Daily forecast needs a paid OneCall subscription.
            daily: vec![],
            aqi,
            location,
        })
    }

    async fn current(&self, lat: f64, lon: f64) -> Result<OwCurrentResponse, AppError> {
        self.get_json(
            "weather",
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<OwForecastResponse, AppError> {
        self.get_json(
            "forecast",
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }

    async fn air_quality(&self, lat: f64, lon: f64) -> Result<Option<AirQuality>, AppError> {
        let response: OwAirResponse = self
            .get_json(
                "air_pollution",
                &[("lat", lat.to_string()), ("lon", lon.to_string())],
            )
            .await?;

        Ok(response.list.into_iter().next().map(|entry| AirQuality {
            aqi: entry.main.aqi,
            co: entry.components.co,
            no: entry.components.no,
            no2: entry.components.no2,
            o3: entry.components.o3,
            so2: entry.components.so2,
            pm2_5: entry.components.pm2_5,
            pm10: entry.components.pm10,
        }))
    }

    /// Generic GET with status mapping shared by all endpoints.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::WeatherUnavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| AppError::WeatherUnavailable(e.to_string())),
            reqwest::StatusCode::NOT_FOUND => Err(AppError::LocationNotFound),
            reqwest::StatusCode::UNAUTHORIZED => Err(AppError::InvalidApiKey),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(AppError::RateLimited),
            status => Err(AppError::WeatherUnavailable(format!(
                "{} returned {}",
                path, status
            ))),
        }
    }
}

// ─── Raw OpenWeather response shapes ─────────────────────────

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwCondition>,
    main: OwMain,
    #[serde(default)]
    wind: Option<OwWind>,
    #[serde(default)]
    visibility: Option<f64>,
    sys: OwSys,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: i32,
    pressure: i32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: i32,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwCondition>,
    /// Probability of precipitation, 0.0..=1.0
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    #[serde(default)]
    list: Vec<OwAirEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    main: OwAirIndex,
    components: OwAirComponents,
}

#[derive(Debug, Deserialize)]
struct OwAirIndex {
    aqi: i32,
}

#[derive(Debug, Deserialize)]
struct OwAirComponents {
    co: f64,
    no: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    pm2_5: f64,
    pm10: f64,
}

// ─── Mapping ─────────────────────────────────────────────────

/// m/s to rounded km/h.
fn kmh(meters_per_second: f64) -> i32 {
    (meters_per_second * 3.6).round() as i32
}

fn map_current(raw: &OwCurrentResponse) -> CurrentWeather {
    let condition = raw.weather.first();
    let wind = raw.wind.as_ref();

    CurrentWeather {
        temp: raw.main.temp.round() as i32,
        feels_like: raw.main.feels_like.round() as i32,
        condition: condition.map(|c| c.main.clone()).unwrap_or_default(),
        description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
        humidity: raw.main.humidity,
        wind_speed: wind.map(|w| kmh(w.speed)).unwrap_or(0),
        wind_direction: wind.map(|w| w.deg).unwrap_or(0),
        pressure: raw.main.pressure,
        visibility: (raw.visibility.unwrap_or(0.0) / 1000.0).round() as i32,
        // UV index needs the OneCall API, not available on the free tier.
        uv_index: 0,
        sunrise: format_unix_rfc3339(raw.sys.sunrise),
        sunset: format_unix_rfc3339(raw.sys.sunset),
        last_updated: format_utc_rfc3339(chrono::Utc::now()),
    }
}

fn map_hourly(entry: &OwForecastEntry) -> HourlyWeather {
    let condition = entry.weather.first();

    HourlyWeather {
        time: format_unix_rfc3339(entry.dt),
        temp: entry.main.temp.round() as i32,
        condition: condition.map(|c| c.main.clone()).unwrap_or_default(),
        icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
        precipitation: (entry.pop * 100.0).round() as i32,
        wind_speed: entry.wind.as_ref().map(|w| kmh(w.speed)).unwrap_or(0),
    }
}

/// Limited data for guests: headline conditions only, detail fields
/// zeroed, no forecast and no air quality.
fn guest_payload(current: CurrentWeather, location: LocationInfo) -> WeatherData {
    WeatherData {
        current: CurrentWeather {
            humidity: 0,
            wind_speed: 0,
            wind_direction: 0,
            pressure: 0,
            visibility: 0,
            uv_index: 0,
            sunrise: String::new(),
            sunset: String::new(),
            ..current
        },
        hourly: vec![],
        daily: vec![],
        aqi: None,
        location,
    }
}

fn map_location(raw: &OwCurrentResponse) -> LocationInfo {
    LocationInfo {
        name: raw.name.clone(),
        country: raw.sys.country.clone(),
        state: None,
        lat: raw.coord.lat,
        lon: raw.coord.lon,
    }
}
