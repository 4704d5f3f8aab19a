#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use school_calendar::{
    CalendarManager, MemoryCalendarStore, SharedBackend, StudentGroup, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router(store: MemoryCalendarStore) -> axum::Router {
    let backend: SharedBackend = Arc::new(store);
    let mut manager = CalendarManager::with_shared_store(backend);
    manager.load().unwrap();
    http_api::router(http_api::AppState::new(manager))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router(MemoryCalendarStore::new());
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn class_lifecycle_via_http_api() {
    let app = new_router(MemoryCalendarStore::new());

    let (status, created) = send(
        &app,
        "POST",
        "/classes",
        Some(json!({
            "day": "mardi",
            "subject": "Sciences",
            "group": "5B",
            "startTime": "10:00",
            "endTime": "11:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, schedule) = send(&app, "GET", "/schedule", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule[0]["day"], "mardi");
    assert_eq!(schedule[0]["sessions"][0]["subject"], "Sciences");

    let (status, status_body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_body["success"], "Class saved.");

    let (status, _) = send(&app, "DELETE", &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_class_returns_field_errors() {
    let app = new_router(MemoryCalendarStore::new());
    let (status, body) = send(
        &app,
        "POST",
        "/classes",
        Some(json!({
            "day": "lundi",
            "subject": "Maths",
            "group": "6A",
            "startTime": "08:00",
            "endTime": "07:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["fields"]["endTime"], "End time must be after start time");

    let (_, schedule) = send(&app, "GET", "/schedule", None).await;
    assert_eq!(schedule, json!([]));
}

#[tokio::test]
async fn holidays_and_vacations_are_listed_in_date_order() {
    let app = new_router(MemoryCalendarStore::new());
    for (name, date) in [("Noël", "2024-12-25"), ("Armistice", "2024-11-11")] {
        let (status, _) = send(
            &app,
            "POST",
            "/holidays",
            Some(json!({ "name": name, "date": date })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, vacation) = send(
        &app,
        "POST",
        "/vacations",
        Some(json!({
            "name": "Été",
            "startDate": "2024-07-01",
            "endDate": "2024-07-10",
            "type": "vacation"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, holidays) = send(&app, "GET", "/holidays", None).await;
    assert_eq!(holidays[0]["name"], "Armistice");
    assert_eq!(holidays[1]["name"], "Noël");
    assert_eq!(holidays[0]["type"], "bankHoliday");

    let (_, vacations) = send(&app, "GET", "/vacations", None).await;
    assert_eq!(vacations[0]["durationDays"], 10);

    let uri = format!("/vacations/{}", vacation["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, vacations) = send(&app, "GET", "/vacations", None).await;
    assert_eq!(vacations, json!([]));
}

#[tokio::test]
async fn posting_with_known_id_edits_in_place() {
    let app = new_router(MemoryCalendarStore::new());
    let (_, created) = send(
        &app,
        "POST",
        "/holidays",
        Some(json!({ "name": "Ascension", "date": "2024-05-09" })),
    )
    .await;
    let id = created["id"].clone();
    let (status, _) = send(
        &app,
        "POST",
        "/holidays",
        Some(json!({ "id": id, "name": "Jeudi de l'Ascension", "date": "2024-05-09" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, holidays) = send(&app, "GET", "/holidays", None).await;
    assert_eq!(holidays.as_array().unwrap().len(), 1);
    assert_eq!(holidays[0]["name"], "Jeudi de l'Ascension");
}

#[tokio::test]
async fn save_failure_is_reported_as_server_error() {
    let store = MemoryCalendarStore::new();
    store.set_fail_writes(true);
    let app = new_router(store);
    let (status, body) = send(
        &app,
        "POST",
        "/holidays",
        Some(json!({ "name": "Pentecôte", "date": "2024-05-20" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Unable to save your changes.");

    let (_, status_body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status_body["error"], "Unable to save your changes.");
}

#[tokio::test]
async fn groups_come_from_the_directory() {
    let app = new_router(
        MemoryCalendarStore::new().with_groups(vec![StudentGroup::new("6A"), StudentGroup::new("5B")]),
    );
    let (status, groups) = send(&app, "GET", "/groups", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(groups, json!(["6A", "5B"]));
}
