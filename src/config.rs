//! Application configuration loaded from environment variables.
//!
//! Everything is validated eagerly at startup; a missing or malformed
//! value is a fatal error before the server binds its listener.

use std::env;

use crate::services::geocoding::GeocodingProvider;

/// Minimum length for JWT signing secrets.
const MIN_SECRET_LEN: usize = 32;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// True when APP_ENV=production; controls Secure cookies and
    /// error-detail exposure.
    pub production: bool,
    /// Frontend origin for OAuth redirects and CORS
    pub frontend_url: String,
    /// Postgres connection string
    pub database_url: String,

    // --- Token signing ---
    /// Secret for access tokens (short-lived)
    pub access_token_secret: String,
    /// Secret for refresh tokens (long-lived, cookie-scoped)
    pub refresh_token_secret: String,
    /// Access token lifetime (default 15m)
    pub access_token_ttl: chrono::Duration,
    /// Refresh token lifetime (default 7d)
    pub refresh_token_ttl: chrono::Duration,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,

    // --- Google OAuth ---
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_callback_url: String,

    // --- Weather / geocoding providers ---
    pub openweather_api_key: String,
    pub geocoding_provider: GeocodingProvider,
    pub geocoding_api_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            production: false,
            frontend_url: "http://localhost:5173".to_string(),
            database_url: "postgres://localhost/skycast_test".to_string(),
            access_token_secret: "test_access_secret_32_bytes_min!!".to_string(),
            refresh_token_secret: "test_refresh_secret_32_bytes_min!".to_string(),
            access_token_ttl: chrono::Duration::minutes(15),
            refresh_token_ttl: chrono::Duration::days(7),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_client_secret".to_string(),
            google_callback_url: "http://localhost:8080/auth/google/callback".to_string(),
            openweather_api_key: "test_openweather_key".to_string(),
            geocoding_provider: GeocodingProvider::OpenWeather,
            geocoding_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let access_token_secret = required_secret("JWT_ACCESS_SECRET")?;
        let refresh_token_secret = required_secret("JWT_REFRESH_SECRET")?;
        if access_token_secret == refresh_token_secret {
            return Err(ConfigError::Invalid(
                "JWT_REFRESH_SECRET",
                "must differ from JWT_ACCESS_SECRET".to_string(),
            ));
        }

        // State signing defaults to the refresh secret when no dedicated
        // key is configured.
        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .unwrap_or_else(|_| refresh_token_secret.clone())
            .into_bytes();

        let geocoding_provider = match env::var("GEOCODING_PROVIDER") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::Invalid("GEOCODING_PROVIDER", e))?,
            Err(_) => GeocodingProvider::OpenWeather,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", "must be a port number".to_string()))?,
            production: env::var("APP_ENV").as_deref() == Ok("production"),
            frontend_url: required("CLIENT_ORIGIN")?,
            database_url: required("DATABASE_URL")?,

            access_token_secret,
            refresh_token_secret,
            access_token_ttl: ttl_from_env("JWT_ACCESS_EXPIRES", "15m")?,
            refresh_token_ttl: ttl_from_env("JWT_REFRESH_EXPIRES", "7d")?,
            oauth_state_key,

            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_callback_url: required("GOOGLE_CALLBACK_URL")?,

            openweather_api_key: required("OPENWEATHER_API_KEY")?,
            geocoding_provider,
            geocoding_api_key: env::var("GEOCODING_API_KEY").ok(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn required_secret(name: &'static str) -> Result<String, ConfigError> {
    let value = required(name)?;
    if value.len() < MIN_SECRET_LEN {
        return Err(ConfigError::Invalid(
            name,
            format!("must be at least {MIN_SECRET_LEN} characters"),
        ));
    }
    Ok(value)
}

fn ttl_from_env(name: &'static str, default: &str) -> Result<chrono::Duration, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    parse_duration(&raw).ok_or_else(|| {
        ConfigError::Invalid(name, format!("'{raw}' is not a duration like 15m or 7d"))
    })
}

/// Parse a duration string of the form `<number><s|m|h|d>`.
fn parse_duration(raw: &str) -> Option<chrono::Duration> {
    let raw = raw.trim();
    let (value, unit) = raw.split_at(raw.len().checked_sub(1)?);
    let value: i64 = value.parse().ok()?;
    if value <= 0 {
        return None;
    }
    match unit {
        "s" => Some(chrono::Duration::seconds(value)),
        "m" => Some(chrono::Duration::minutes(value)),
        "h" => Some(chrono::Duration::hours(value)),
        "d" => Some(chrono::Duration::days(value)),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
