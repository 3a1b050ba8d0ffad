//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time_utils::format_utc_rfc3339;

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TempUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TempUnit::Celsius => "C",
            TempUnit::Fahrenheit => "F",
        }
    }

    fn parse_or_default(raw: &str) -> Self {
        match raw {
            "F" => TempUnit::Fahrenheit,
            _ => TempUnit::Celsius,
        }
    }
}

/// Wind speed unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindUnit {
    #[serde(rename = "kph")]
    Kph,
    #[serde(rename = "mph")]
    Mph,
}

impl WindUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            WindUnit::Kph => "kph",
            WindUnit::Mph => "mph",
        }
    }

    fn parse_or_default(raw: &str) -> Self {
        match raw {
            "mph" => WindUnit::Mph,
            _ => WindUnit::Kph,
        }
    }
}

/// Display unit preferences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUnits {
    pub temp_unit: TempUnit,
    pub wind_unit: WindUnit,
}

/// A location the user pinned to their dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// Public user shape returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub units: UserUnits,
    pub saved_locations: Vec<SavedLocation>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for creating a user on first OAuth login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
}

/// User row as stored in Postgres.
///
/// Unit columns are free-form text and `saved_locations` is raw JSONB;
/// both are normalized exactly once, here, when mapping to [`User`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub temp_unit: String,
    pub wind_unit: String,
    pub saved_locations: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Map the stored row into the public `User` shape.
    ///
    /// Malformed persisted `saved_locations` collapses to an empty list,
    /// unknown unit strings to the defaults.
    pub fn into_user(self) -> User {
        let saved_locations = match serde_json::from_value(self.saved_locations) {
            Ok(locations) => locations,
            Err(err) => {
                tracing::warn!(
                    user_id = %self.id,
                    error = %err,
                    "Malformed saved_locations in store, defaulting to empty"
                );
                Vec::new()
            }
        };

        User {
            id: self.id,
            google_id: self.google_id,
            email: self.email,
            name: self.name,
            photo_url: self.photo_url,
            units: UserUnits {
                temp_unit: TempUnit::parse_or_default(&self.temp_unit),
                wind_unit: WindUnit::parse_or_default(&self.wind_unit),
            },
            saved_locations,
            created_at: format_utc_rfc3339(self.created_at),
            updated_at: format_utc_rfc3339(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_locations(saved_locations: serde_json::Value) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            google_id: "g-123".to_string(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            photo_url: String::new(),
            temp_unit: "C".to_string(),
            wind_unit: "kph".to_string(),
            saved_locations,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_malformed_saved_locations_default_to_empty() {
        for value in [
            serde_json::json!("not an array"),
            serde_json::json!({"id": "loc_1"}),
            serde_json::json!(42),
            serde_json::json!([{"name": "missing fields"}]),
        ] {
            let user = row_with_locations(value).into_user();
            assert!(user.saved_locations.is_empty());
        }
    }

    #[test]
    fn test_well_formed_saved_locations_survive() {
        let value = serde_json::json!([
            {"id": "loc_1", "name": "Berlin", "lat": 52.52, "lon": 13.405, "isDefault": true},
            {"id": "loc_2", "name": "Oslo", "lat": 59.91, "lon": 10.75},
        ]);
        let user = row_with_locations(value).into_user();
        assert_eq!(user.saved_locations.len(), 2);
        assert_eq!(user.saved_locations[0].is_default, Some(true));
        assert_eq!(user.saved_locations[1].is_default, None);
    }

    #[test]
    fn test_unknown_units_fall_back_to_defaults() {
        let mut row = row_with_locations(serde_json::json!([]));
        row.temp_unit = "kelvin".to_string();
        row.wind_unit = "knots".to_string();
        let user = row.into_user();
        assert_eq!(user.units.temp_unit, TempUnit::Celsius);
        assert_eq!(user.units.wind_unit, WindUnit::Kph);
    }

    #[test]
    fn test_unit_wire_format() {
        let units = UserUnits {
            temp_unit: TempUnit::Fahrenheit,
            wind_unit: WindUnit::Mph,
        };
        let json = serde_json::to_value(units).unwrap();
        assert_eq!(json, serde_json::json!({"tempUnit": "F", "windUnit": "mph"}));
    }
}
