//! tests/api/static_files.rs
//! Collected assets are served from STATIC_ROOT, outside the JSON envelope.

#[path = "../mod.rs"]
mod common;

use axum::Router;
use reqwest::StatusCode;

#[tokio::test]
async fn serves_files_from_static_root() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("css")).unwrap();
    std::fs::write(root.path().join("css/site.css"), "body { margin: 0; }").unwrap();

    let env = common::test_env(&[("STATIC_ROOT", root.path().to_str().unwrap())]);
    let base_url: String = common::spawn_app_with(env, Router::new());

    let resp: reqwest::Response = reqwest::get(format!("{}/static/css/site.css", base_url))
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/css"));
    assert_eq!(resp.text().await.unwrap(), "body { margin: 0; }");
}

#[tokio::test]
async fn missing_assets_are_404() {
    let root = tempfile::tempdir().unwrap();
    let env = common::test_env(&[("STATIC_ROOT", root.path().to_str().unwrap())]);
    let base_url: String = common::spawn_app_with(env, Router::new());

    let resp: reqwest::Response = reqwest::get(format!("{}/static/nope.js", base_url))
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
