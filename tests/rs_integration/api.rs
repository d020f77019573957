//! Integration tests for the JSON API.

use reqwest::Client;
use serde_json::{Value, json};

use crate::common::spawn_companion;

#[tokio::test]
async fn block_test_resolves_normalized_domains() {
    let companion = spawn_companion().await;
    let resp = Client::new()
        .post(companion.url("/api/block/test"))
        .json(&json!({"domains": ["https://does-not-exist.invalid/path"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["resolutions"],
        json!({"does-not-exist.invalid": [], "www.does-not-exist.invalid": []})
    );
}

#[tokio::test]
async fn block_flush_succeeds() {
    let companion = spawn_companion().await;
    let resp = Client::new()
        .post(companion.url("/api/block/flush"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn block_errors_use_the_error_shape() {
    let companion = spawn_companion().await;
    let resp = Client::new()
        .post(companion.url("/api/block/apply"))
        .json(&json!({"domains": ["youtube.com"]}))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    // depends on whether the test runs elevated, the hosts file is a temp file either way
    if status == 403 {
        assert_eq!(body, json!({"ok": false, "error": "permission"}));
    } else {
        assert_eq!(status, 200);
        assert_eq!(body["domains"], json!(["youtube.com", "www.youtube.com"]));
    }
}

#[tokio::test]
async fn export_import_round_trip() {
    let companion = spawn_companion().await;
    let client = Client::new();

    let body: Value = client
        .get(companion.url("/api/export"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"ok": true, "data": null}));

    let data = json!({"history": [25, 25, 50], "theme": "dark"});
    let resp = client
        .post(companion.url("/api/import"))
        .json(&data)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(companion.dir().join("cloud.json").exists());

    let body: Value = client
        .get(companion.url("/api/export"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"ok": true, "data": data}));
}

#[tokio::test]
async fn service_worker_is_served() {
    let companion = spawn_companion().await;
    let resp = Client::new()
        .get(companion.url("/sw.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/javascript");
    assert!(resp.text().await.unwrap().contains("skipWaiting"));
}
