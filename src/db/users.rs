// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postgres-backed user store with typed operations.
//!
//! One table, one wrapper. The `users` table carries profile fields,
//! unit preferences, and the saved-locations list as JSONB.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{NewUser, SavedLocation, TempUnit, UserRow, WindUnit};

const USER_COLUMNS: &str = "id, google_id, email, name, photo_url, temp_unit, wind_unit, \
     saved_locations, created_at, updated_at";

/// Postgres user store.
#[derive(Clone)]
pub struct UserStore {
    pool: Option<PgPool>,
}

impl UserStore {
    /// Connect to Postgres and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!("Connected to Postgres");

        Ok(Self { pool: Some(pool) })
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Get a user by internal id.
    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by the Google-issued account id.
    pub async fn get_user_by_google_id(&self, google_id: &str) -> Result<Option<UserRow>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(google_id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user on first login, with default preferences.
    ///
    /// Concurrent first logins for the same `google_id` race here; the
    /// unique constraint makes the losing insert a no-op and we fall back
    /// to reading the winner's row.
    pub async fn create_user(&self, new: &NewUser) -> Result<UserRow, AppError> {
        let query = format!(
            "INSERT INTO users (google_id, email, name, photo_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (google_id) DO NOTHING \
             RETURNING {USER_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, UserRow>(&query)
            .bind(&new.google_id)
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.photo_url)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(row) = inserted {
            tracing::info!(user_id = %row.id, "Created user");
            return Ok(row);
        }

        // Lost the race: another request created the row first.
        self.get_user_by_google_id(&new.google_id)
            .await?
            .ok_or_else(|| {
                AppError::Database("User insert conflicted but row is missing".to_string())
            })
    }

    /// Partial update of profile fields; absent values are left unchanged.
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        temp_unit: Option<TempUnit>,
        wind_unit: Option<WindUnit>,
    ) -> Result<Option<UserRow>, AppError> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                temp_unit = COALESCE($3, temp_unit), \
                wind_unit = COALESCE($4, wind_unit), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(name)
            .bind(temp_unit.map(TempUnit::as_str))
            .bind(wind_unit.map(WindUnit::as_str))
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Read the saved-locations list for a user.
    ///
    /// Returns `None` when the user does not exist. Malformed persisted
    /// JSON is normalized to an empty list here, at the store boundary.
    pub async fn get_saved_locations(
        &self,
        id: Uuid,
    ) -> Result<Option<Vec<SavedLocation>>, AppError> {
        let value: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT saved_locations FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool()?)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(value.map(|(raw,)| match serde_json::from_value(raw) {
            Ok(locations) => locations,
            Err(err) => {
                tracing::warn!(
                    user_id = %id,
                    error = %err,
                    "Malformed saved_locations in store, defaulting to empty"
                );
                Vec::new()
            }
        }))
    }

    /// Replace the saved-locations list for a user.
    pub async fn set_saved_locations(
        &self,
        id: Uuid,
        locations: &[SavedLocation],
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(locations)
            .map_err(|e| AppError::Database(format!("Failed to encode locations: {}", e)))?;

        sqlx::query("UPDATE users SET saved_locations = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(value)
            .execute(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
