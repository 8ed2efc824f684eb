mod common;

use axum::http::{header, HeaderValue, StatusCode};
use common::{bearer, seed_conference, seed_speaker, seed_talk, setup, setup_with};
use serde_json::{json, Value};

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = setup().await;

    let response = app.server.get("/api/talks").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].as_str().unwrap().contains("Missing Authorization header"));
}

#[tokio::test]
async fn test_non_bearer_scheme_is_rejected() {
    let app = setup().await;

    let response = app
        .server
        .get("/api/talks")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("Bearer scheme"));
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = setup().await;

    let response = app
        .server
        .get("/api/talks")
        .authorization_bearer("another-token-0123456789abcdefghijkl")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid or expired token.");
}

#[tokio::test]
async fn test_short_token_is_malformed() {
    let app = setup().await;

    let response = app.server.get("/api/talks").authorization_bearer("short").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid token format.");
}

#[tokio::test]
async fn test_unconfigured_tokens_fail_closed() {
    let app = setup_with(|config| config.api_tokens.clear()).await;

    let response = app
        .server
        .get("/api/talks")
        .add_header(header::AUTHORIZATION, HeaderValue::from_str(&bearer()).unwrap())
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = setup().await;

    let response = app.server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/talks/{id}/reject"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
}

// ============================================================================
// Resource descriptors
// ============================================================================

#[tokio::test]
async fn test_resource_schema_endpoint() {
    let app = setup().await;

    let response = app
        .server
        .get("/api/resources/conferences/schema")
        .authorization_bearer(common::TOKEN)
        .await;
    response.assert_status_ok();
    let schema: Value = response.json();
    assert_eq!(schema["slug"], "conferences");
    assert_eq!(schema["form"]["tabs"].as_array().unwrap().len(), 3);

    let missing = app
        .server
        .get("/api/resources/nope/schema")
        .authorization_bearer(common::TOKEN)
        .await;
    missing.assert_status_not_found();
}

// ============================================================================
// Talks
// ============================================================================

#[tokio::test]
async fn test_create_talk_validates() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/talks")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "title": "", "abstract": "x" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["errors"]["title"][0], "The title field is required.");
    assert!(body["errors"]["speaker_id"].is_array());
}

#[tokio::test]
async fn test_create_and_list_talks() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Ada Lovelace").await;

    let created = app
        .server
        .post("/api/talks")
        .authorization_bearer(common::TOKEN)
        .json(&json!({
            "title": "Analytical Engines",
            "abstract": "Notes on the engine",
            "speaker_id": speaker.id,
            "length": "lightning",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let talk: Value = created.json();
    assert_eq!(talk["status"], "submitted");
    assert_eq!(talk["length"], "lightning");

    let listed = app
        .server
        .get("/api/talks")
        .add_query_param("search", "engine")
        .authorization_bearer(common::TOKEN)
        .await;
    listed.assert_status_ok();
    let page: Value = listed.json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["export_label"], "Export (1)");
    assert_eq!(page["data"][0]["speaker_name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_approve_talk_and_disabled_second_approve() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Grace Hopper").await;
    let talk = seed_talk(&app.pool, speaker.id, "Compilers").await;

    let response = app
        .server
        .post(&format!("/api/talks/{}/approve", talk.id))
        .authorization_bearer(common::TOKEN)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["talk"]["status"], "approved");
    assert_eq!(body["notification"]["title"], "Approved!");
    assert_eq!(body["notification"]["severity"], "success");

    let again = app
        .server
        .post(&format!("/api/talks/{}/approve", talk.id))
        .authorization_bearer(common::TOKEN)
        .await;
    again.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_requires_confirmation() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Barbara Liskov").await;
    let talk = seed_talk(&app.pool, speaker.id, "Substitution").await;
    let path = format!("/api/talks/{}/reject", talk.id);

    let unconfirmed = app.server.post(&path).authorization_bearer(common::TOKEN).await;
    unconfirmed.assert_status(StatusCode::CONFLICT);
    let body: Value = unconfirmed.json();
    assert_eq!(body["error"], "Confirmation Required");

    let confirmed = app
        .server
        .post(&path)
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "confirmed": true }))
        .await;
    confirmed.assert_status_ok();
    let body: Value = confirmed.json();
    assert_eq!(body["talk"]["status"], "rejected");
    assert_eq!(body["notification"]["severity"], "info");
}

#[tokio::test]
async fn test_missing_talk_is_not_found() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/talks/999/approve")
        .authorization_bearer(common::TOKEN)
        .await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["message"], "Talk not found");
}

#[tokio::test]
async fn test_bulk_approve_and_delete() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Edsger Dijkstra").await;
    let first = seed_talk(&app.pool, speaker.id, "Goto").await;
    let second = seed_talk(&app.pool, speaker.id, "Semaphores").await;

    let approved = app
        .server
        .post("/api/talks/bulk-approve")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "ids": [first.id, second.id] }))
        .await;
    approved.assert_status_ok();
    let body: Value = approved.json();
    assert_eq!(body["affected"], 2);
    assert_eq!(body["notification"]["body"], "The talks has been approved.");

    let empty = app
        .server
        .post("/api/talks/bulk-delete")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "ids": [], "confirmed": true }))
        .await;
    empty.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let unconfirmed = app
        .server
        .post("/api/talks/bulk-delete")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "ids": [first.id] }))
        .await;
    unconfirmed.assert_status(StatusCode::CONFLICT);

    let deleted = app
        .server
        .post("/api/talks/bulk-delete")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "ids": [first.id, second.id], "confirmed": true }))
        .await;
    deleted.assert_status_ok();
    let body: Value = deleted.json();
    assert_eq!(body["affected"], 2);
}

#[tokio::test]
async fn test_export_talks_as_csv() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Alan Kay").await;
    seed_talk(&app.pool, speaker.id, "Objects, messages").await;

    let response = app
        .server
        .get("/api/talks/export")
        .authorization_bearer(common::TOKEN)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "text/csv; charset=utf-8");
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert!(disposition.to_str().unwrap().contains("talks-export.csv"));

    let text = response.text();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,title,speaker"));
    assert!(lines.next().unwrap().contains("\"Objects, messages\""));
}

// ============================================================================
// Speakers
// ============================================================================

#[tokio::test]
async fn test_speaker_detail_includes_talks() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Niklaus Wirth").await;
    seed_talk(&app.pool, speaker.id, "Pascal").await;

    let response = app
        .server
        .get(&format!("/api/speakers/{}", speaker.id))
        .authorization_bearer(common::TOKEN)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Niklaus Wirth");
    assert_eq!(body["talks"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_spoken"], false);
    assert!(body["avatar_url"].as_str().unwrap().starts_with("https://ui-avatars.com/"));
}

#[tokio::test]
async fn test_create_speaker_rejects_bad_email() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/speakers")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "name": "Ken", "email": "not-an-email" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["errors"]["email"][0], "The email field must be a valid email address.");
}

// ============================================================================
// Conferences and sign-up
// ============================================================================

#[tokio::test]
async fn test_create_conference_requires_speakers() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/conferences")
        .authorization_bearer(common::TOKEN)
        .json(&json!({
            "name": "RustConf",
            "description": "<p>Hi</p>",
            "start_date": "2025-10-09 09:00:00",
            "end_date": "2025-10-10 17:00:00",
            "status": "draft",
            "region": "US",
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["errors"]["speakers"][0], "The speakers field is required.");
}

#[tokio::test]
async fn test_sign_up_attendees() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "Donald Knuth").await;
    let conference = seed_conference(&app.pool, "TeXConf", vec![speaker.id]).await;
    assert_eq!(conference.id, 1);

    let response = app
        .server
        .post("/api/signup")
        .authorization_bearer(common::TOKEN)
        .json(&json!({
            "attendees": [
                { "name": "Ann", "email": "ann@example.com" },
                { "name": "Bob", "email": "bob@example.com" },
            ]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["total_price"], "$1000");
    assert_eq!(body["attendees"][0]["ticket_cost"], 500);
    assert_eq!(body["attendees"][0]["is_paid"], true);
    assert_eq!(body["notification"]["title"], "Successfully signed up!");

    let attendees = app
        .server
        .get("/api/conferences/1/attendees")
        .authorization_bearer(common::TOKEN)
        .await;
    attendees.assert_status_ok();
    let list: Vec<Value> = attendees.json();
    assert_eq!(list.len(), 2);
}

#[tokio::test]
async fn test_sign_up_validates_every_row() {
    let app = setup().await;
    let speaker = seed_speaker(&app.pool, "John McCarthy").await;
    seed_conference(&app.pool, "LispConf", vec![speaker.id]).await;

    let response = app
        .server
        .post("/api/signup")
        .authorization_bearer(common::TOKEN)
        .json(&json!({
            "attendees": [
                { "name": "Ann", "email": "ann@example.com" },
                { "name": "", "email": "nope" },
            ]
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["errors"]["attendees.1.name"].is_array());
    assert!(body["errors"]["attendees.1.email"].is_array());

    let attendees = app
        .server
        .get("/api/conferences/1/attendees")
        .authorization_bearer(common::TOKEN)
        .await;
    let list: Vec<Value> = attendees.json();
    assert!(list.is_empty());
}
