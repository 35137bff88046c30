//! tests/api/pages.rs

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn every_legal_page_is_public() {
    let base_url: String = common::spawn_app();

    for (slug, title) in [
        ("privacy", "Privacy Policy"),
        ("terms", "Terms and Conditions"),
        ("about", "About Us"),
        ("contact", "Contact Us"),
        ("overview", "LearnFlow AI Overview"),
    ] {
        let resp: reqwest::Response = reqwest::get(format!("{}/legal/{}", base_url, slug))
            .await
            .expect("Failed to execute request.");

        assert_eq!(resp.status(), StatusCode::OK, "page {slug}");
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["data"]["title"], title);
        assert!(!json["data"]["sections"].as_array().unwrap().is_empty());
    }
}
