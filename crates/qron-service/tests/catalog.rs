//! Health, catalog, and profile endpoint tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn modes_catalog_is_public_and_complete() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/modes").await;
    response.assert_status_ok();
    let modes: serde_json::Value = response.json();
    let modes = modes.as_array().unwrap();
    assert_eq!(modes.len(), 11);

    let static_mode = modes.iter().find(|m| m["id"] == "static").unwrap();
    assert_eq!(static_mode["tier"], "free");
    assert!(static_mode["price_cents"].as_i64().unwrap() > 0);

    let living = modes.iter().find(|m| m["id"] == "living").unwrap();
    assert_eq!(living["tier"], "enterprise");
}

#[tokio::test]
async fn presets_catalog_marks_premium_entries() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/presets").await;
    response.assert_status_ok();
    let presets: serde_json::Value = response.json();
    let presets = presets.as_array().unwrap();
    assert_eq!(presets.len(), 5);

    let premium_count = presets
        .iter()
        .filter(|p| p["is_premium"].as_bool().unwrap())
        .count();
    assert_eq!(premium_count, 3);
}

#[tokio::test]
async fn plans_catalog_lists_all_tiers() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/plans").await;
    response.assert_status_ok();
    let plans: serde_json::Value = response.json();
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 3);

    let enterprise = plans.iter().find(|p| p["id"] == "enterprise").unwrap();
    assert!(enterprise["generations_limit"].is_null());
}

#[tokio::test]
async fn profile_is_created_on_first_touch_with_free_defaults() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/profile")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tier"], "free");
    assert_eq!(body["generations_used"], 0);
    assert_eq!(body["generations_limit"], 10);
    assert_eq!(body["remaining"], 10);
}

#[tokio::test]
async fn profile_requires_authentication() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/profile").await;
    response.assert_status_unauthorized();
}
