//! Uses the single integration test approach.
//!
//! This improves parallelism when running the tests, and reduces the number of binaries that have to be built (and linked)
#![expect(
    clippy::tests_outside_test_module,
    reason = "This is the integration test binary, so it's expected that tests are outside of a test module"
)]
#![expect(clippy::shadow_unrelated, reason = "This is a common pattern in tests")]
#![expect(clippy::indexing_slicing, reason = "This is not problematic in tests")]
#![expect(clippy::unwrap_used, reason = "Using unwrap in tests is fine")]

extern crate alloc;
extern crate core;

mod api;
mod common;
mod websocket;

use reqwest::Client;

use common::spawn_companion;

#[tokio::test]
async fn companion_config_loads() {
    let companion = spawn_companion().await;
    let resp = Client::new()
        .get(companion.url("/manifest.json"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn index_is_served_from_config_dir() {
    let companion = spawn_companion().await;
    let client = Client::new();

    let resp = client.get(companion.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    std::fs::write(companion.dir().join("index.html"), "<h1>Ultra Pomodoro</h1>").unwrap();
    let resp = client.get(companion.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "<h1>Ultra Pomodoro</h1>");
}
