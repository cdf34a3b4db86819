//! Integration tests for the coherence routes: the full
//! validate → resolve → convergence flow over HTTP.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn fearless_content(session_id: Uuid) -> serde_json::Value {
    json!({
        "content": {
            "id": Uuid::new_v4(),
            "session_id": session_id,
            "text": "John climbs the tower fearlessly",
            "position": 2,
            "referenced_entities": ["john"],
            "assertions": [{
                "key": { "subject": "john", "attribute": "fear of heights" },
                "statement": "climbs the tower fearlessly",
                "strength": 0.9,
            }],
            "causal_links": [],
            "ordering_claims": [],
            "themes": [],
            "version": 1,
            "superseded_by": null,
            "created_at": "2026-01-15T10:00:00Z",
        }
    })
}

async fn establish_john(app: &axum::Router, session_id: Uuid) {
    let body = json!({
        "category": "character",
        "fact": "John fears heights",
        "subject": "john",
        "attribute": "fear of heights",
        "established_at": 1,
        "immutability": "soft",
    });
    let (status, _) = common::post_json(
        app.clone(),
        &format!("/api/v1/sessions/{session_id}/lore"),
        &body,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validate_flags_the_fearless_climb() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();
    establish_john(&app, session_id).await;

    let (status, json) =
        common::post_json(app, "/api/v1/coherence/validate", &fearless_content(session_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_coherent"], false);
    let contradictions = json["contradictions"].as_array().unwrap();
    assert!(!contradictions.is_empty());
    assert_eq!(contradictions[0]["kind"], "direct");
}

#[tokio::test]
async fn test_validate_clean_content_is_coherent() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();
    establish_john(&app, session_id).await;

    let mut body = fearless_content(session_id);
    body["content"]["text"] = json!("John waits at the foot of the tower");
    body["content"]["assertions"] = json!([]);

    let (status, json) = common::post_json(app, "/api/v1/coherence/validate", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_coherent"], true);
    assert_eq!(json["blocks_surfacing"], false);
}

#[tokio::test]
async fn test_resolve_returns_applied_resolution() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();
    establish_john(&app, session_id).await;

    let content_body = fearless_content(session_id);
    let (status, validation) =
        common::post_json(app.clone(), "/api/v1/coherence/validate", &content_body).await;
    assert_eq!(status, StatusCode::OK);

    let resolve_body = json!({
        "content": content_body["content"],
        "contradiction": validation["contradictions"][0],
    });
    let (status, resolution) =
        common::post_json(app, "/api/v1/coherence/resolve", &resolve_body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["implementation_success"], true);
    assert!(
        !resolution["player_explanation"]
            .as_str()
            .unwrap()
            .is_empty()
    );
    let kind = resolution["solution"]["kind"].as_str().unwrap();
    assert!(["character_driven", "perspective_based", "universal"].contains(&kind));
}

#[tokio::test]
async fn test_validate_with_empty_text_returns_400() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    let mut body = fearless_content(session_id);
    body["content"]["text"] = json!("   ");

    let (status, json) = common::post_json(app, "/api/v1/coherence/validate", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "input_validation_error");
}

#[tokio::test]
async fn test_convergence_over_stored_threads() {
    let app = common::build_test_app();
    let session_id = Uuid::new_v4();

    for (title, participants, themes) in [
        ("The Debt", vec!["john", "marta"], vec!["grief", "duty"]),
        ("The Tower", vec!["john"], vec!["duty", "ambition"]),
    ] {
        let body = json!({
            "id": Uuid::new_v4(),
            "title": title,
            "participants": participants,
            "themes": themes,
            "tension": 0.5,
        });
        let (status, _) = common::put_json(
            app.clone(),
            &format!("/api/v1/sessions/{session_id}/threads"),
            &body,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = common::post_json(
        app,
        "/api/v1/coherence/convergence",
        &json!({ "session_id": session_id }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["storyline_count"], 2);
    assert_eq!(json["is_convergent"], true);
    let score = json["score"].as_f64().unwrap();
    assert!((score - 0.8).abs() < 1e-9);
}
