//! Capacity enforcement tests.
//!
//! These tests require a running server, migrated database, and the seeded
//! admin account (`cargo run -p lotkeeper-cli -- seed`).
//!
//! Run with: `cargo test -p lotkeeper-integration-tests -- --ignored`

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

use lotkeeper_integration_tests::{base_url, client, registered_driver};

/// Login as the seeded admin.
async fn admin_client() -> Client {
    let admin = client();
    let resp = admin
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": "admin@lotkeeper.dev", "password": "password123"}))
        .send()
        .await
        .expect("admin login failed");
    assert_eq!(resp.status(), 200, "seeded admin account must exist");
    admin
}

/// Create a lot with exactly one space and return its JSON.
async fn one_space_lot(admin: &Client) -> Value {
    let resp = admin
        .post(format!("{}/api/admin/lots", base_url()))
        .json(&json!({
            "name": format!("Capacity Test {}", Uuid::new_v4().simple()),
            "address": "1 Test Way",
            "latitude": 21.88,
            "longitude": -102.29,
            "total_spots": 1,
            "hourly_rate": "25",
        }))
        .send()
        .await
        .expect("lot create failed");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("not JSON");
    body["data"].clone()
}

#[tokio::test]
#[ignore = "Requires running server and seeded admin account"]
async fn test_full_lot_rejects_new_sessions() {
    let admin = admin_client().await;
    let lot = one_space_lot(&admin).await;

    let (driver, _) = registered_driver().await;
    let create = |c: &Client| {
        c.post(format!("{}/api/sessions", base_url()))
            .json(&json!({"lot_id": lot["id"], "plate": "CAP-001"}))
            .send()
    };

    // First session takes the only space.
    let first = create(&driver).await.expect("first create failed");
    assert_eq!(first.status(), 201);

    // Second must be rejected with a capacity error, not accepted.
    let (other_driver, _) = registered_driver().await;
    let second = create(&other_driver).await.expect("second create failed");
    assert_eq!(second.status(), 409);

    let body: Value = second.json().await.expect("not JSON");
    assert_eq!(body["error"]["code"], "LOT_FULL");
}

#[tokio::test]
#[ignore = "Requires running server and seeded admin account"]
async fn test_concurrent_creates_take_exactly_one_space() {
    let admin = admin_client().await;
    let lot = one_space_lot(&admin).await;

    let (driver_a, _) = registered_driver().await;
    let (driver_b, _) = registered_driver().await;

    let make = |c: Client, plate: &'static str| {
        let lot_id = lot["id"].clone();
        async move {
            c.post(format!("{}/api/sessions", base_url()))
                .json(&json!({"lot_id": lot_id, "plate": plate}))
                .send()
                .await
                .expect("create failed")
                .status()
        }
    };

    // Race two creates against the single free space.
    let (status_a, status_b) =
        tokio::join!(make(driver_a, "RAC-001"), make(driver_b, "RAC-002"));

    let successes = [status_a, status_b]
        .iter()
        .filter(|s| s.as_u16() == 201)
        .count();
    let conflicts = [status_a, status_b]
        .iter()
        .filter(|s| s.as_u16() == 409)
        .count();

    assert_eq!(successes, 1, "exactly one create may win ({status_a}, {status_b})");
    assert_eq!(conflicts, 1, "the loser must observe a capacity error");
}

#[tokio::test]
#[ignore = "Requires running server and seeded admin account"]
async fn test_exit_frees_the_space() {
    let admin = admin_client().await;
    let lot = one_space_lot(&admin).await;

    let (driver, _) = registered_driver().await;
    let resp = driver
        .post(format!("{}/api/sessions", base_url()))
        .json(&json!({"lot_id": lot["id"], "plate": "FRE-001"}))
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("not JSON");
    let session_id = body["data"]["session_id"].as_i64().expect("session_id");

    // Pay and validate the exit.
    let resp = driver
        .post(format!("{}/api/sessions/{session_id}/pay", base_url()))
        .send()
        .await
        .expect("pay failed");
    assert_eq!(resp.status(), 200);

    let resp = driver
        .post(format!(
            "{}/api/sessions/{session_id}/validate-exit",
            base_url()
        ))
        .send()
        .await
        .expect("validate failed");
    assert_eq!(resp.status(), 200);

    // The space is free again: another session fits.
    let (next_driver, _) = registered_driver().await;
    let resp = next_driver
        .post(format!("{}/api/sessions", base_url()))
        .json(&json!({"lot_id": lot["id"], "plate": "FRE-002"}))
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), 201);
}
