//! tests/api/security.rs
//! Session enforcement and the Content-Security-Policy header.

#[path = "../mod.rs"]
mod common;

use axum::Router;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn protected_routes_require_a_session() {
    let base_url: String = common::spawn_app();
    let client = reqwest::Client::new();

    for path in ["/", "/quizzes", "/quizzes/1", "/video", "/book", "/book/download/1", "/user/profile"] {
        let resp: reqwest::Response = client
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path {path}");
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["code"], 401);
        assert_eq!(json["data"]["error"], "missing_session");
    }
}

#[tokio::test]
async fn protected_posts_are_rejected_before_the_body_is_read() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/quizzes/create", base_url))
        .json(&json!({ "title": "Fractions", "questions": [] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_the_default_policy() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::get(format!("{}/health", base_url))
        .await
        .expect("Failed to execute request.");

    let policy: &str = resp
        .headers()
        .get("content-security-policy")
        .expect("missing Content-Security-Policy")
        .to_str()
        .unwrap();
    assert!(policy.contains("default-src 'self'"));
}

#[tokio::test]
async fn policy_can_be_overridden() {
    let env = common::test_env(&[("CONTENT_SECURITY_POLICY", "default-src 'none'")]);
    let base_url: String = common::spawn_app_with(env, Router::new());

    let resp: reqwest::Response = reqwest::get(format!("{}/legal/about", base_url))
        .await
        .expect("Failed to execute request.");

    assert_eq!(
        resp.headers().get("content-security-policy").unwrap(),
        "default-src 'none'"
    );
}
