//! HTTP integration tests: error mapping, response envelopes, and the
//! owner-identity requirement, exercised through the full middleware stack.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use common::build_test_app;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("reading response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

fn post_json(uri: &str, body: Value, owner: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(owner) = owner {
        builder = builder.header("x-user-id", owner);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, owner: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(owner) = owner {
        builder = builder.header("x-user-id", owner);
    }
    builder.body(Body::empty()).unwrap()
}

fn valid_convert_body() -> Value {
    json!({
        "notes": [{"note": "C4", "start": 0.0, "end": 1.0, "duration": 1.0, "volume": 80}],
        "instrument": "Flute"
    })
}

/// Convert through the API and return the new artifact id.
async fn convert_one(app: &axum::Router) -> i64 {
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/conversions", valid_convert_body(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn health_reports_ok(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn convert_returns_created_artifact(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app
        .oneshot(post_json("/api/v1/conversions", valid_convert_body(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["instrument"], "Flute");
    // Stub engine reports no tempo, so the 120 default applies.
    assert_eq!(data["tempo"], 120.0);
    assert_eq!(data["notes"][0]["note"], "C4");
    assert!(data["blob_url"].as_str().unwrap().contains("renders/"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn convert_rejects_invalid_notes(pool: PgPool) {
    let app = build_test_app(pool);

    // end < start
    let body = json!({
        "notes": [{"note": "C4", "start": 1.0, "end": 0.5}],
        "instrument": "Flute"
    });
    let response = app
        .oneshot(post_json("/api/v1/conversions", body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_conversion_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app
        .oneshot(get("/api/v1/conversions/9999", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tracks_require_owner_identity(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.oneshot(get("/api/v1/tracks", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn promote_and_list_tracks(pool: PgPool) {
    let app = build_test_app(pool);
    let artifact_id = convert_one(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/tracks",
            json!({"artifact_id": artifact_id, "name": "My Hum"}),
            Some("user1"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["owner_id"], "user1");
    assert_eq!(body["data"]["name"], "My Hum");

    let response = app
        .oneshot(get("/api/v1/tracks", Some("user1")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn promote_blank_name_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let artifact_id = convert_one(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/tracks",
            json!({"artifact_id": artifact_id, "name": "   "}),
            Some("user1"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn promote_missing_artifact_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/tracks",
            json!({"artifact_id": 9999, "name": "My Hum"}),
            Some("user1"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn foreign_track_deletion_is_forbidden(pool: PgPool) {
    let app = build_test_app(pool);
    let artifact_id = convert_one(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/tracks",
            json!({"artifact_id": artifact_id, "name": "Mine"}),
            Some("user1"),
        ))
        .await
        .unwrap();
    let track_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let delete = |owner: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/tracks/{track_id}"))
            .header("x-user-id", owner)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete("intruder")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");

    // The owner can delete it.
    let response = app.oneshot(delete("user1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
