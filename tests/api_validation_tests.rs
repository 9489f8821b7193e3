// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation security tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn auth_header(state: &fittrack_api::AppState) -> String {
    format!(
        "Bearer {}",
        common::create_test_jwt("user-1", &state.config.jwt_signing_key)
    )
}

#[tokio::test]
async fn test_exercise_filter_too_long() {
    let (app, state) = common::create_test_app();
    let long_filter = "a".repeat(101); // 101 characters

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&format!("/api/sessions?exercise={}", long_filter))
                .header(header::AUTHORIZATION, auth_header(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_cursor_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/sessions?cursor=!!!not-base64!!!")
                .header(header::AUTHORIZATION, auth_header(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_upsert_invalid_date() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "exerciseName": "Chest Press",
        "date": "02/15/2025",
        "sets": []
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/sessions")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_upsert_empty_exercise_name() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "exerciseName": "",
        "date": "2025-02-15",
        "sets": []
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/sessions")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_upsert_valid_is_accepted_without_db_write() {
    // The upsert is debounced: the handler returns the computed key
    // and volume without touching Firestore, so the offline mock is
    // enough for a 200.
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "exerciseName": "Chest Press",
        "muscleGroup": "chest",
        "date": "2025-02-15",
        "sets": [
            { "id": "s1", "reps": 10, "weight": 90.0, "time": 0.0 },
            { "id": "s2", "reps": 8, "weight": 95.0, "time": 0.0 }
        ]
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/sessions")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["key"], "chest-press--2025-02-15");
    assert_eq!(parsed["totalVolume"], 10.0 * 90.0 + 8.0 * 95.0);
    assert_eq!(parsed["pending"], true);
}

#[tokio::test]
async fn test_metric_invalid_weight() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "date": "2025-02-15",
        "weight": -10.0
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/metrics")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_routine_name_empty() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({ "name": "" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/routines")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_invalid_month() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/stats/calendar?month=2025-13")
                .header(header::AUTHORIZATION, auth_header(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_targets_invalid_week() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/stats/targets?week=next-monday")
                .header(header::AUTHORIZATION, auth_header(&state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_empty_body_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/import")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from("Machine,Date\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

fn csv_of_at_least(bytes: usize) -> String {
    let mut csv = String::from("Machine,Date,A,B,C,D,Reps,Sets,Time,E,Weight\n");
    while csv.len() < bytes {
        csv.push_str("Chest Press,2/15/2025,,,,,10,3,,,90\n");
    }
    csv
}

#[tokio::test]
async fn test_import_accepts_multi_megabyte_body() {
    // Above the framework's 2 MB default body cap, below the import
    // route's raised limit. Preview keeps the offline mock happy.
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/import?preview=true")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv_of_at_least(3 * 1024 * 1024)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_import_body_over_cap_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/import?preview=true")
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv_of_at_least(5 * 1024 * 1024 + 1)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
