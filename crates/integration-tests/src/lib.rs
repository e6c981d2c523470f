//! Integration test helpers for Lotkeeper.
//!
//! # Running Tests
//!
//! These tests drive a running server over HTTP and are `#[ignore]`d by
//! default:
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p lotkeeper-cli -- migrate
//! cargo run -p lotkeeper-cli -- seed
//!
//! # Start the server
//! cargo run -p lotkeeper-server
//!
//! # Run the ignored integration tests
//! cargo test -p lotkeeper-integration-tests -- --ignored
//! ```

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("LOTKEEPER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-holding client, not yet logged in.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh driver account and return its logged-in client.
///
/// Each call uses a unique email, so tests do not interfere with each other
/// or with seeded data.
///
/// # Panics
///
/// Panics if registration does not succeed.
pub async fn registered_driver() -> (Client, String) {
    let client = client();
    let email = format!("it-{}@test.lotkeeper.dev", Uuid::new_v4().simple());

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "password": "integration-test-pw",
            "full_name": "Integration Tester",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status(), 201, "registration should succeed");
    (client, email)
}

/// Fetch the first active lot with free capacity, as JSON.
///
/// # Panics
///
/// Panics if the listing fails or no usable lot exists (seed first).
pub async fn any_open_lot(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/api/lots", base_url()))
        .send()
        .await
        .expect("lot listing failed");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.expect("lot listing is not JSON");
    let lots = body["data"].as_array().expect("data should be an array");

    lots.iter()
        .find(|lot| lot["occupied_spots"].as_i64() < lot["total_spots"].as_i64())
        .cloned()
        .expect("no lot with free capacity; run `lk-cli seed` first")
}

/// Open a session in `lot`, returning its id.
///
/// # Panics
///
/// Panics if the creation request fails.
pub async fn open_session(client: &Client, lot: &Value) -> i64 {
    let resp = client
        .post(format!("{}/api/sessions", base_url()))
        .json(&json!({"lot_id": lot["id"], "plate": "ITC-001"}))
        .send()
        .await
        .expect("session create failed");

    assert_eq!(resp.status(), 201, "session create should succeed");
    let body: Value = resp.json().await.expect("session create is not JSON");
    body["data"]["session_id"]
        .as_i64()
        .expect("session_id missing")
}
