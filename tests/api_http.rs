// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - actor registration + identity decision
// - POST /complaints (the verified-citizen gate, classification attach)
// - PATCH /complaints/{id}/status (role gates, conflict mapping)
// - notes and /stats

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use fir_desk::api::{self, AppState};
use fir_desk::classify::ai_adapter::{DisabledProvider, MockProvider};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, with the AI path disabled so no
/// request ever leaves the process.
fn test_router() -> Router {
    let state = AppState::with_provider(Arc::new(DisabledProvider));
    api::create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, payload: Option<Json>) -> (StatusCode, Json) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match payload {
        Some(p) => builder
            .header("content-type", "application/json")
            .body(Body::from(p.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

/// Register an admin, a verified citizen, and an officer; return their ids.
async fn seed_actors(app: &Router) -> (String, String, String) {
    let (status, admin) = send(
        app,
        "POST",
        "/actors/admins",
        Some(json!({ "name": "HQ", "email": "hq@police.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let admin_id = admin["id"].as_str().expect("admin id").to_string();

    let (status, citizen) = send(
        app,
        "POST",
        "/actors/citizens",
        Some(json!({ "name": "Asha", "email": "asha@example.com", "phone": "9999999999" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let citizen_id = citizen["id"].as_str().expect("citizen id").to_string();

    let (status, _) = send(
        app,
        "POST",
        &format!("/actors/{citizen_id}/identity"),
        Some(json!({ "admin_id": admin_id, "decision": "Verified", "remark": "card ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, officer) = send(
        app,
        "POST",
        "/actors/officers",
        Some(json!({
            "admin_id": admin_id,
            "name": "Sharma",
            "email": "sharma@police.example",
            "badge_id": "PB-7"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let officer_id = officer["id"].as_str().expect("officer id").to_string();

    (admin_id, citizen_id, officer_id)
}

async fn file_complaint(app: &Router, citizen_id: &str, description: &str) -> Json {
    let (status, complaint) = send(
        app,
        "POST",
        "/complaints",
        Some(json!({
            "actor_id": citizen_id,
            "title": "Incident report",
            "description": description,
            "incident_type": "Theft",
            "location": "Sector 12 market",
            "incident_date": "2026-08-01",
            "incident_time": "18:30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "filing should succeed: {complaint}");
    complaint
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok", "health body should be 'ok'");
}

#[tokio::test]
async fn api_classify_matches_rules_without_persisting() {
    let app = test_router();

    let (status, v) = send(
        &app,
        "POST",
        "/classify",
        Some(json!({ "text": "someone stole my bag, bag chori near the bus stop" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["category"], "Theft");
    assert_eq!(v["severity"], "Medium");
    assert_eq!(v["provenance"], "rule-matched");

    let (status, v) = send(&app, "POST", "/classify", Some(json!({ "text": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "validation");
}

#[tokio::test]
async fn api_unverified_citizen_cannot_file() {
    let app = test_router();

    let (status, citizen) = send(
        &app,
        "POST",
        "/actors/citizens",
        Some(json!({ "name": "Ravi", "email": "ravi@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let citizen_id = citizen["id"].as_str().expect("id");

    let (status, v) = send(
        &app,
        "POST",
        "/complaints",
        Some(json!({
            "actor_id": citizen_id,
            "title": "t",
            "description": "d",
            "incident_type": "Theft",
            "location": "l",
            "incident_date": "2026-08-01",
            "incident_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(v["kind"], "authorization");
}

#[tokio::test]
async fn api_rejected_filings_never_spend_an_ai_call() {
    let mock = MockProvider::returning(r#"{"crime_type":"Other","severity":"Low"}"#);
    let state = AppState::with_provider(Arc::new(mock.clone()));
    let app = api::create_router(state);

    let (status, admin) = send(
        &app,
        "POST",
        "/actors/admins",
        Some(json!({ "name": "HQ", "email": "hq@police.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let admin_id = admin["id"].as_str().expect("admin id").to_string();

    let (status, citizen) = send(
        &app,
        "POST",
        "/actors/citizens",
        Some(json!({ "name": "Ravi", "email": "ravi@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let citizen_id = citizen["id"].as_str().expect("citizen id").to_string();

    // Unverified citizen, description no rule matches: turned away at the
    // identity gate before the provider is consulted.
    let (status, _) = send(
        &app,
        "POST",
        "/complaints",
        Some(json!({
            "actor_id": citizen_id,
            "title": "t",
            "description": "completely unmatched narrative",
            "incident_type": "Other",
            "location": "l",
            "incident_date": "2026-08-01",
            "incident_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(mock.call_count(), 0, "identity rejection must precede the AI call");

    // Verified citizen, blank title: field validation also precedes it.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/actors/{citizen_id}/identity"),
        Some(json!({ "admin_id": admin_id, "decision": "Verified" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/complaints",
        Some(json!({
            "actor_id": citizen_id,
            "title": "  ",
            "description": "completely unmatched narrative",
            "incident_type": "Other",
            "location": "l",
            "incident_date": "2026-08-01",
            "incident_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0, "validation rejection must precede the AI call");

    // The well-formed request does reach the provider.
    let (status, _) = send(
        &app,
        "POST",
        "/complaints",
        Some(json!({
            "actor_id": citizen_id,
            "title": "Something odd",
            "description": "completely unmatched narrative",
            "incident_type": "Other",
            "location": "l",
            "incident_date": "2026-08-01",
            "incident_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn api_complaint_carries_rule_classification_on_creation() {
    let app = test_router();
    let (_admin, citizen, _officer) = seed_actors(&app).await;

    let complaint = file_complaint(&app, &citizen, "my bike chori from the parking lot").await;
    assert_eq!(complaint["status"], "Pending");
    assert_eq!(complaint["classification"]["category"], "Theft");
    assert_eq!(complaint["classification"]["provenance"], "rule-matched");
    assert!(complaint["assigned_officer"].is_null());

    // Disabled AI path: unmatched text degrades to the safe default.
    let complaint = file_complaint(
        &app,
        &citizen,
        "Strange unprecedented event occurred involving documents",
    )
    .await;
    assert_eq!(complaint["classification"]["category"], "Other");
    assert_eq!(complaint["classification"]["severity"], "Medium");
    assert_eq!(complaint["classification"]["provenance"], "ai-inferred");
}

#[tokio::test]
async fn api_full_lifecycle_to_resolved() {
    let app = test_router();
    let (admin, citizen, officer) = seed_actors(&app).await;

    let complaint = file_complaint(&app, &citizen, "wallet lost near the station").await;
    let id = complaint["id"].as_str().expect("complaint id");
    let status_uri = format!("/complaints/{id}/status");

    // Admin triage.
    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": admin, "status": "Under Review" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "Under Review");

    // FIR registration with assignment.
    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": admin, "status": "FIR Registered", "assigned_officer": officer })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "FIR Registered");
    assert_eq!(v["assigned_officer"], officer.as_str());

    // Assigned officer works the case and marks it solved.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/complaints/{id}/notes"),
        Some(json!({ "actor_id": officer, "note": "CCTV footage collected" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": officer, "status": "Solved by Officer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "Solved by Officer");

    // Admin confirms resolution.
    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": admin, "status": "Resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "Resolved");

    let (status, notes) = send(&app, "GET", &format!("/complaints/{id}/notes"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes.as_array().expect("notes array").len(), 1);

    let (status, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_status"]["Resolved"], 1);
}

#[tokio::test]
async fn api_illegal_transition_maps_to_409_and_bad_role_to_403() {
    let app = test_router();
    let (admin, citizen, officer) = seed_actors(&app).await;

    let complaint = file_complaint(&app, &citizen, "house broken into").await;
    let id = complaint["id"].as_str().expect("complaint id");
    let status_uri = format!("/complaints/{id}/status");

    // Skipping straight to Resolved is not an edge of the graph.
    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": admin, "status": "Resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(v["kind"], "invalid_transition");

    // The edge exists, but officers cannot register FIRs.
    let (status, v) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": officer, "status": "FIR Registered" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(v["kind"], "authorization");

    // Citizens never drive transitions.
    let (status, _) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(json!({ "actor_id": citizen, "status": "Under Review" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // State is untouched after the failures above.
    let (status, v) = send(&app, "GET", &format!("/complaints/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "Pending");
}

#[tokio::test]
async fn api_assignment_requires_a_real_officer() {
    let app = test_router();
    let (admin, citizen, _officer) = seed_actors(&app).await;

    let complaint = file_complaint(&app, &citizen, "phone snatch at the crossing").await;
    let id = complaint["id"].as_str().expect("complaint id");

    // Assigning the citizen is refused before any transition is attempted.
    let (status, v) = send(
        &app,
        "PATCH",
        &format!("/complaints/{id}/status"),
        Some(json!({
            "actor_id": admin,
            "status": "FIR Registered",
            "assigned_officer": citizen
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "validation");

    // Unknown assignee: 404.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/complaints/{id}/status"),
        Some(json!({
            "actor_id": admin,
            "status": "FIR Registered",
            "assigned_officer": uuid::Uuid::new_v4()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_unknown_complaint_is_404() {
    let app = test_router();
    let id = uuid::Uuid::new_v4();
    let (status, v) = send(&app, "GET", &format!("/complaints/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["kind"], "not_found");
}
