//! Integration tests for the operations-center JSON endpoints.
//!
//! Run with: cargo test -p easyvol-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use easyvol_integration_tests::{base_url, client, login};

#[tokio::test]
#[ignore = "Requires running server"]
async fn api_endpoints_require_authentication() {
    let client = client();
    for path in ["/api/events/map", "/api/operations/status"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("Failed to reach server");
        assert_ne!(resp.status(), StatusCode::OK, "{path} served anonymously");
    }
}

#[tokio::test]
#[ignore = "Requires running server and test credentials"]
async fn events_map_returns_geocoded_events_only() {
    let client = login().await;
    let resp = client
        .get(format!("{}/api/events/map", base_url()))
        .send()
        .await
        .expect("Failed to fetch map events");
    assert_eq!(resp.status(), StatusCode::OK);

    let events: Vec<Value> = resp.json().await.expect("Map payload is not JSON");
    for event in &events {
        assert!(event["latitude"].is_number());
        assert!(event["longitude"].is_number());
        assert!(event["title"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running server and test credentials"]
async fn operations_status_shape_is_stable() {
    let client = login().await;
    let resp = client
        .get(format!("{}/api/operations/status", base_url()))
        .send()
        .await
        .expect("Failed to fetch operations status");
    assert_eq!(resp.status(), StatusCode::OK);

    let status: Value = resp.json().await.expect("Status payload is not JSON");
    assert!(status["assignments"].is_array());
    assert!(status["on_call"].is_array());
    assert!(status["available_radios"].is_number());
    assert!(status["open_events"].is_number());
}
