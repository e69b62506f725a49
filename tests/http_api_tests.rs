#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tower::util::ServiceExt;
use training_cadence::{
    FixedClock, ItemStatus, TrainingCadence, TrainingItem, TrainingLibrary, TrainingStatus,
    http_api,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap()
}

fn new_router() -> axum::Router {
    let state =
        http_api::AppState::with_clock(TrainingLibrary::new(), Arc::new(FixedClock::new(now())));
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn item_lifecycle_via_http_api() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/items",
            json!({ "name": "Scaffolding", "cadence": "Quarterly" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: TrainingItem = read_json(response).await;
    assert_eq!(created.id.as_deref(), Some("1"));
    assert_eq!(created.cadence, TrainingCadence::Quarterly);
    assert_eq!(created.scheduled_due_date, Some(now() + Duration::days(7)));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: TrainingItem = read_json(response).await;
    assert_eq!(fetched.name, "Scaffolding");

    let completed_at = Utc.with_ymd_and_hms(2025, 8, 15, 9, 0, 0).unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/items/1/complete",
            json!({ "completed_at": completed_at }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: TrainingItem = read_json(response).await;
    assert_eq!(updated.last_completed_at, Some(completed_at));

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completion_without_body_uses_clock() {
    let app = new_router();
    app.clone()
        .oneshot(json_request("POST", "/items", json!({ "name": "Welding" })))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("POST", "/items/1/complete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: TrainingItem = read_json(response).await;
    assert_eq!(updated.cadence, TrainingCadence::Annually);
    assert_eq!(updated.last_completed_at, Some(now()));
}

#[tokio::test]
async fn bulk_create_spreads_due_dates() {
    let app = new_router();
    let response = app
        .oneshot(json_request(
            "POST",
            "/items/bulk",
            json!([
                { "name": "A", "cadence": "Annually" },
                { "name": "B", "cadence": "Annually" },
                { "name": "C", "cadence": "Annually" }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Vec<TrainingItem> = read_json(response).await;
    let dates: Vec<_> = created.iter().map(|i| i.scheduled_due_date).collect();
    assert_eq!(
        dates,
        vec![
            Some(now() + Duration::days(7)),
            Some(now() + Duration::days(128)),
            Some(now() + Duration::days(249)),
        ]
    );
}

#[tokio::test]
async fn status_lists_items_by_urgency() {
    let app = new_router();
    for name in ["First", "Second"] {
        app.clone()
            .oneshot(json_request("POST", "/items", json!({ "name": name })))
            .await
            .unwrap();
    }

    let response = app.oneshot(empty_request("GET", "/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let statuses: Vec<ItemStatus> = read_json(response).await;
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].name, "First");
    assert_eq!(statuses[0].status, TrainingStatus::DueSoon);
    assert_eq!(statuses[1].status, TrainingStatus::NeverTrained);
}

#[tokio::test]
async fn invalid_and_missing_items_map_to_error_codes() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/items", json!({ "name": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");

    let response = app
        .oneshot(empty_request("POST", "/items/42/complete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_config_endpoints_respond() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(empty_request("GET", "/config")).await.unwrap();
    let config: serde_json::Value = read_json(response).await;
    assert_eq!(config["slot_width_days"], 7);
}
