// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod user;
pub mod weather;

pub use user::{NewUser, SavedLocation, TempUnit, User, UserRow, UserUnits, WindUnit};
pub use weather::{
    AirQuality, AutocompleteResult, CurrentWeather, DailyWeather, HourlyWeather, LocationInfo,
    WeatherData,
};
