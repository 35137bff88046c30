//! tests/global_errors/500.rs
//! Ensures that bare error statuses and unavailable services still use the envelope.

#[path = "../mod.rs"]
mod common;

use axum::{http::StatusCode as AxumStatus, routing::get, Router};
use learnflow_ai::config::state::AppState;
use reqwest::StatusCode;
use serde_json::Value;

async fn failing_handler() -> AxumStatus {
    AxumStatus::INTERNAL_SERVER_ERROR
}

#[tokio::test]
async fn returns_500_on_internal_error() {
    let extra: Router<AppState> = Router::new().route("/boom", get(failing_handler));
    let base_url: String = common::spawn_app_with(common::test_env(&[]), extra);

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/boom", base_url))
        .send()
        .await
        .expect("Failed to make request.");

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "INTERNAL_SERVER_ERROR");
    assert_eq!(json["code"], 500);
}

#[tokio::test]
async fn database_health_is_503_without_a_database() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::get(format!("{}/health/db", base_url))
        .await
        .expect("Failed to make request.");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 503);
    assert_eq!(json["data"]["database"], "disconnected");
}
