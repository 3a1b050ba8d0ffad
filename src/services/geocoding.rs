// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geocoding and city autocomplete.
//!
//! Two interchangeable providers: the OpenWeather geo API (default,
//! reuses the weather API key) and OpenCage (used when configured with
//! its own key).

use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::weather::AutocompleteResult;

const AUTOCOMPLETE_LIMIT: u8 = 10;

/// Which upstream resolves city names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    OpenWeather,
    OpenCage,
}

impl FromStr for GeocodingProvider {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "openweather" => Ok(GeocodingProvider::OpenWeather),
            "opencage" => Ok(GeocodingProvider::OpenCage),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Geocoding API client.
#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    provider: GeocodingProvider,
    api_key: Option<String>,
    openweather_api_key: String,
    openweather_base: String,
    opencage_base: String,
}

impl GeocodingClient {
    pub fn new(
        provider: GeocodingProvider,
        api_key: Option<String>,
        openweather_api_key: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider,
            api_key,
            openweather_api_key,
            openweather_base: "http://api.openweathermap.org/geo/1.0".to_string(),
            opencage_base: "https://api.opencagedata.com/geocode/v1".to_string(),
        }
    }

    /// Override provider endpoints (tests).
    pub fn with_base_urls(mut self, openweather: &str, opencage: &str) -> Self {
        self.openweather_base = openweather.to_string();
        self.opencage_base = opencage.to_string();
        self
    }

    /// OpenCage only kicks in when it has a key to use.
    fn effective_provider(&self) -> GeocodingProvider {
        match self.provider {
            GeocodingProvider::OpenCage if self.api_key.is_some() => GeocodingProvider::OpenCage,
            _ => GeocodingProvider::OpenWeather,
        }
    }

    /// Resolve a city name to coordinates.
    pub async fn geocode_city(&self, city: &str) -> Result<(f64, f64), AppError> {
        let result = match self.effective_provider() {
            GeocodingProvider::OpenWeather => self.geocode_with_openweather(city).await,
            GeocodingProvider::OpenCage => self.geocode_with_opencage(city).await,
        };

        result.map_err(|err| match err {
            AppError::CityNotFound => AppError::CityNotFound,
            other => {
                tracing::warn!(error = %other, city, "Geocoding failed");
                AppError::GeocodingFailed
            }
        })
    }

    /// Search cities for autocomplete. Failures degrade to an empty list.
    pub async fn search_cities(&self, query: &str) -> Vec<AutocompleteResult> {
        let result = match self.effective_provider() {
            GeocodingProvider::OpenWeather => self.search_with_openweather(query).await,
            GeocodingProvider::OpenCage => self.search_with_opencage(query).await,
        };

        match result {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::warn!(error = %err, query, "City search failed");
                Vec::new()
            }
        }
    }

    async fn geocode_with_openweather(&self, city: &str) -> Result<(f64, f64), AppError> {
        let results = self.openweather_lookup(city, 1).await?;
        results
            .first()
            .map(|r| (r.lat, r.lon))
            .ok_or(AppError::CityNotFound)
    }

    async fn search_with_openweather(
        &self,
        query: &str,
    ) -> Result<Vec<AutocompleteResult>, AppError> {
        let results = self.openweather_lookup(query, AUTOCOMPLETE_LIMIT).await?;
        Ok(results
            .into_iter()
            .map(|r| AutocompleteResult {
                name: r.name,
                country: r.country,
                state: r.state,
                lat: r.lat,
                lon: r.lon,
            })
            .collect())
    }

    async fn openweather_lookup(
        &self,
        query: &str,
        limit: u8,
    ) -> Result<Vec<OwGeoResult>, AppError> {
        let url = format!("{}/direct", self.openweather_base);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("appid", self.openweather_api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "geocoding returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))
    }

    async fn geocode_with_opencage(&self, city: &str) -> Result<(f64, f64), AppError> {
        let results = self.opencage_lookup(city, 1).await?;
        results
            .first()
            .map(|r| (r.geometry.lat, r.geometry.lng))
            .ok_or(AppError::CityNotFound)
    }

    async fn search_with_opencage(
        &self,
        query: &str,
    ) -> Result<Vec<AutocompleteResult>, AppError> {
        let results = self.opencage_lookup(query, AUTOCOMPLETE_LIMIT).await?;
        Ok(results
            .into_iter()
            .map(|r| AutocompleteResult {
                name: r
                    .components
                    .city
                    .or(r.components.town)
                    .or(r.components.village)
                    .unwrap_or_else(|| "Unknown".to_string()),
                country: r.components.country.unwrap_or_default(),
                state: r.components.state,
                lat: r.geometry.lat,
                lon: r.geometry.lng,
            })
            .collect())
    }

    async fn opencage_lookup(
        &self,
        query: &str,
        limit: u8,
    ) -> Result<Vec<OcResult>, AppError> {
        // effective_provider() guarantees the key is present here.
        let key = self.api_key.as_deref().unwrap_or_default();
        let url = format!("{}/json", self.opencage_base);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("key", key.to_string()),
                ("limit", limit.to_string()),
                ("no_annotations", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "geocoding returned {}",
                response.status()
            )));
        }

        let body: OcResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        Ok(body.results)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    results: Vec<OcResult>,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    geometry: OcGeometry,
    components: OcComponents,
}

#[derive(Debug, Deserialize)]
struct OcGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OcComponents {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
    state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "openweather".parse::<GeocodingProvider>().unwrap(),
            GeocodingProvider::OpenWeather
        );
        assert_eq!(
            "opencage".parse::<GeocodingProvider>().unwrap(),
            GeocodingProvider::OpenCage
        );
        assert!("nominatim".parse::<GeocodingProvider>().is_err());
    }

    #[test]
    fn test_opencage_without_key_falls_back() {
        let client = GeocodingClient::new(
            GeocodingProvider::OpenCage,
            None,
            "ow_key".to_string(),
        );
        assert_eq!(client.effective_provider(), GeocodingProvider::OpenWeather);

        let client = GeocodingClient::new(
            GeocodingProvider::OpenCage,
            Some("oc_key".to_string()),
            "ow_key".to_string(),
        );
        assert_eq!(client.effective_provider(), GeocodingProvider::OpenCage);
    }
}
