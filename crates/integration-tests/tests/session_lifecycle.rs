//! End-to-end tests for the parking session lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - Seeded data (`cargo run -p lotkeeper-cli -- seed`)
//! - The server running (`cargo run -p lotkeeper-server`)
//!
//! Run with: `cargo test -p lotkeeper-integration-tests -- --ignored`

use serde_json::{Value, json};

use lotkeeper_integration_tests::{any_open_lot, base_url, open_session, registered_driver};

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_create_pay_validate_flow() {
    let (client, _email) = registered_driver().await;
    let lot = any_open_lot(&client).await;
    let session_id = open_session(&client, &lot).await;

    // Pay: active -> paid
    let resp = client
        .post(format!("{}/api/sessions/{session_id}/pay", base_url()))
        .json(&json!({"method": "card"}))
        .send()
        .await
        .expect("pay request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("pay response is not JSON");
    let payment = &body["data"];
    assert_eq!(payment["status"], "succeeded");
    assert!(payment["billed_hours"].as_i64().unwrap_or(0) >= 1);

    // subtotal + tax - discount == total (string-encoded decimals)
    let parse = |v: &Value| {
        v.as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .expect("decimal field")
    };
    let total = parse(&payment["subtotal"]) + parse(&payment["tax"]) - parse(&payment["discount"]);
    assert!((total - parse(&payment["total"])).abs() < 0.01);

    // Validate exit: paid -> finalized
    let resp = client
        .post(format!(
            "{}/api/sessions/{session_id}/validate-exit",
            base_url()
        ))
        .send()
        .await
        .expect("validate-exit request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("validate response is not JSON");
    assert_eq!(body["data"]["status"], "finalized");
    assert!(!body["data"]["exit_time"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_pay_twice_conflicts_and_amount_is_stable() {
    let (client, _email) = registered_driver().await;
    let lot = any_open_lot(&client).await;
    let session_id = open_session(&client, &lot).await;

    let pay_url = format!("{}/api/sessions/{session_id}/pay", base_url());

    let first = client.post(&pay_url).send().await.expect("first pay failed");
    assert_eq!(first.status(), 200);
    let first_body: Value = first.json().await.expect("not JSON");
    let first_total = first_body["data"]["total"].clone();

    // The second attempt must observe a conflict, not overwrite state.
    let second = client.post(&pay_url).send().await.expect("second pay failed");
    assert_eq!(second.status(), 409);
    let second_body: Value = second.json().await.expect("not JSON");
    assert_eq!(second_body["success"], false);
    assert_eq!(second_body["error"]["code"], "CONFLICT");

    // Amount is unchanged from the first successful payment.
    let resp = client
        .get(format!("{}/api/sessions/{session_id}", base_url()))
        .send()
        .await
        .expect("session read failed");
    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["data"]["status"], "paid");
    assert_eq!(body["data"]["amount"], first_total);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_validate_exit_requires_paid_status() {
    let (client, _email) = registered_driver().await;
    let lot = any_open_lot(&client).await;
    let session_id = open_session(&client, &lot).await;

    // Still active: exit validation must be rejected.
    let resp = client
        .post(format!(
            "{}/api/sessions/{session_id}/validate-exit",
            base_url()
        ))
        .send()
        .await
        .expect("validate-exit request failed");
    assert_eq!(resp.status(), 409);

    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_session_round_trip_preserves_fields() {
    let (client, _email) = registered_driver().await;
    let lot = any_open_lot(&client).await;
    let session_id = open_session(&client, &lot).await;

    let url = format!("{}/api/sessions/{session_id}", base_url());
    let first: Value = client
        .get(&url)
        .send()
        .await
        .expect("read failed")
        .json()
        .await
        .expect("not JSON");

    let second: Value = client
        .get(&url)
        .send()
        .await
        .expect("read failed")
        .json()
        .await
        .expect("not JSON");

    for field in ["entry_time", "status", "amount", "plate", "entry_code"] {
        assert_eq!(first["data"][field], second["data"][field], "{field}");
    }
    assert_eq!(first["data"]["status"], "active");
    assert!(first["data"]["amount"].is_null());
}
