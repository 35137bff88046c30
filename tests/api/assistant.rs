//! tests/api/assistant.rs

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

async fn ask(base_url: &str, query: &str) -> Value {
    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/api/chat", base_url))
        .json(&json!({ "query": query }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn chat_answers_by_keyword() {
    let base_url: String = common::spawn_app();

    let upload: Value = ask(&base_url, "How can I Upload a book?").await;
    assert_eq!(
        upload["data"]["answer"],
        "To upload content, visit your dashboard and click 'Add Resource'."
    );

    let verify: Value = ask(&base_url, "how do I verify my account").await;
    assert_eq!(
        verify["data"]["answer"],
        "Teacher verification is handled securely. Check your profile settings."
    );

    let other: Value = ask(&base_url, "hello").await;
    assert_eq!(
        other["data"]["answer"],
        "LearnFlow AI is a platform designed to empower educators and learners across Africa."
    );
}

#[tokio::test]
async fn chat_without_a_query_gets_the_overview() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/api/chat", base_url))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request.");

    let json: Value = resp.json().await.unwrap();
    assert!(json["data"]["answer"].as_str().unwrap().starts_with("LearnFlow AI"));
}

#[tokio::test]
async fn feedback_is_always_acknowledged() {
    let base_url: String = common::spawn_app();
    let client = reqwest::Client::new();

    for body in [json!({ "feedback": "Great platform" }), json!({ "feedback": "" }), json!({})] {
        let resp: reqwest::Response = client
            .post(format!("{}/api/feedback", base_url))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["data"]["status"], "received");
    }
}

#[tokio::test]
async fn chat_rejects_non_json_bodies() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/api/chat", base_url))
        .body("query=upload")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 415);
}
