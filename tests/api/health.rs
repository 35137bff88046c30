//! tests/api/health.rs

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_reports_ok_without_backing_services() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::get(format!("{}/health", base_url))
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["code"], 200);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["environment"], "test");
    assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["data"]["instance"].is_string());
}

#[tokio::test]
async fn ping_answers_pong() {
    let base_url: String = common::spawn_app();

    let json: Value = reqwest::get(format!("{}/user/ping", base_url))
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    assert_eq!(json["data"], "pong");
}

#[tokio::test]
async fn sitemap_needs_the_database() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::get(format!("{}/sitemap.xml", base_url))
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["messages"][0], "Database unavailable");
}
