//! Integration tests for canon ingestion routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_establish_lore_returns_200_with_id() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    let body = json!({
        "category": "character",
        "fact": "John fears heights",
        "subject": "John",
        "attribute": "fear of heights",
        "established_at": 1,
        "immutability": "soft",
    });

    let (status, json) =
        common::post_json(app, &format!("/api/v1/sessions/{session_id}/lore"), &body).await;

    assert_eq!(status, StatusCode::OK);
    Uuid::parse_str(json["id"].as_str().unwrap()).unwrap();
}

#[tokio::test]
async fn test_establish_lore_with_empty_fact_returns_400() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    let body = json!({
        "category": "character",
        "fact": "  ",
        "subject": "John",
        "attribute": "fear of heights",
        "established_at": 1,
        "immutability": "soft",
    });

    let (status, json) =
        common::post_json(app, &format!("/api/v1/sessions/{session_id}/lore"), &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "input_validation_error");
}

#[tokio::test]
async fn test_record_content_returns_200_with_id() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    let body = json!({
        "text": "John enters the tower at dusk",
        "position": 1,
        "themes": ["duty"],
    });

    let (status, json) =
        common::post_json(app, &format!("/api/v1/sessions/{session_id}/content"), &body).await;

    assert_eq!(status, StatusCode::OK);
    Uuid::parse_str(json["id"].as_str().unwrap()).unwrap();
}

#[tokio::test]
async fn test_record_content_with_stale_position_returns_400() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();
    let uri = format!("/api/v1/sessions/{session_id}/content");

    let first = json!({ "text": "John enters the tower", "position": 2 });
    let (status, _) = common::post_json(app.clone(), &uri, &first).await;
    assert_eq!(status, StatusCode::OK);

    let second = json!({ "text": "John hesitates", "position": 2 });
    let (status, json) = common::post_json(app, &uri, &second).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "input_validation_error");
}

#[tokio::test]
async fn test_upsert_thread_returns_200_with_id() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();
    let thread_id = Uuid::new_v4();

    let body = json!({
        "id": thread_id,
        "title": "The Debt",
        "participants": ["john", "marta"],
        "themes": ["grief", "duty"],
        "tension": 0.5,
    });

    let (status, json) =
        common::put_json(app, &format!("/api/v1/sessions/{session_id}/threads"), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"].as_str().unwrap(), thread_id.to_string());
}

#[tokio::test]
async fn test_missing_body_field_returns_422() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    let (status, _) = common::post_json(
        app,
        &format!("/api/v1/sessions/{session_id}/lore"),
        &json!({}),
    )
    .await;

    // Axum returns 422 for deserialization failures.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
