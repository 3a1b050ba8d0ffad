// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strict vs optional auth middleware behavior.
//!
//! `/api/user/*` sits behind the strict guard and must fail with coded
//! 401s; `/api/weather` sits behind optional auth and must never fail a
//! request over identity problems.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn get_with_auth(uri: &str, auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_guard_without_header_is_no_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get_with_auth("/api/user/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "NO_TOKEN");
}

#[tokio::test]
async fn test_guard_without_bearer_prefix_is_no_token() {
    let (app, _) = common::create_test_app();

    for value in ["Basic dXNlcjpwYXNz", "token-without-scheme", "bearer lowercase"] {
        let response = app
            .clone()
            .oneshot(get_with_auth("/api/user/me", Some(value)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = common::body_json(response).await;
        assert_eq!(body["code"], "NO_TOKEN");
    }
}

#[tokio::test]
async fn test_guard_with_expired_token_is_token_expired() {
    let (app, state) = common::create_test_app();
    let expired = common::expired_token_service(&state.config)
        .issue_access_token(&common::test_user())
        .unwrap();

    let response = app
        .oneshot(get_with_auth(
            "/api/user/me",
            Some(&format!("Bearer {expired}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_guard_with_garbage_token_is_invalid_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get_with_auth("/api/user/me", Some("Bearer not.a.jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_guard_rejects_refresh_token_as_access_token() {
    let (app, state) = common::create_test_app();
    let refresh = state
        .tokens
        .issue_refresh_token(&common::test_user())
        .unwrap();

    let response = app
        .oneshot(get_with_auth(
            "/api/user/me",
            Some(&format!("Bearer {refresh}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_guard_with_valid_token_reaches_the_user_lookup() {
    let (app, state) = common::create_test_app();
    let valid = state
        .tokens
        .issue_access_token(&common::test_user())
        .unwrap();

    let response = app
        .oneshot(get_with_auth(
            "/api/user/me",
            Some(&format!("Bearer {valid}")),
        ))
        .await
        .unwrap();

    // Verification passed; the offline store is the first thing to fail.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_optional_auth_swallows_expired_token() {
    let (app, state) = common::create_test_app();
    let expired = common::expired_token_service(&state.config)
        .issue_access_token(&common::test_user())
        .unwrap();

    let response = app
        .oneshot(get_with_auth(
            "/api/weather?lat=52.52&lon=13.405",
            Some(&format!("Bearer {expired}")),
        ))
        .await
        .unwrap();

    // The identity failure is swallowed and the handler runs as
    // anonymous; the unreachable weather upstream is what fails, not
    // the token.
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "WEATHER_SERVICE_ERROR");
}

#[tokio::test]
async fn test_optional_auth_anonymous_request_proceeds() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get_with_auth("/api/weather?lat=52.52&lon=13.405", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "WEATHER_SERVICE_ERROR");
}

#[tokio::test]
async fn test_weather_requires_city_or_coordinates() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get_with_auth("/api/weather", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_autocomplete_rejects_short_queries() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get_with_auth("/api/autocomplete?query=a", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_autocomplete_degrades_to_empty_suggestions() {
    let (app, _) = common::create_test_app();

    // Geocoding upstream is unreachable; the search degrades instead of
    // failing the request.
    let response = app
        .oneshot(get_with_auth("/api/autocomplete?query=berlin", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["suggestions"], serde_json::json!([]));
}
