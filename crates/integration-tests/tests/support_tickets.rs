//! Support ticket flow tests.
//!
//! Require a running server, migrated database, and the seeded admin
//! account.
//!
//! Run with: `cargo test -p lotkeeper-integration-tests -- --ignored`

use reqwest::Client;
use serde_json::{Value, json};

use lotkeeper_integration_tests::{base_url, client, registered_driver};

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

async fn open_ticket(c: &Client) -> (i64, String) {
    let resp = c
        .post(format!("{}/api/support/tickets", base_url()))
        .json(&json!({
            "category": "technical",
            "subject": "Entry code not scanning",
            "description": "The scanner at the gate rejects my code",
        }))
        .send()
        .await
        .expect("ticket create failed");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("not JSON");
    let id = body["data"]["ticket_id"].as_i64().expect("ticket_id");
    let number = body["data"]["ticket_number"]
        .as_str()
        .expect("ticket_number")
        .to_string();
    (id, number)
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_ticket_thread_flow() {
    let (driver, _) = registered_driver().await;
    let (ticket_id, number) = open_ticket(&driver).await;

    assert!(number.starts_with("TKT-"), "{number}");

    // The opening description is the first message.
    let resp = driver
        .get(format!("{}/api/support/tickets/{ticket_id}", base_url()))
        .send()
        .await
        .expect("ticket read failed");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["data"]["status"], "open");
    let messages = body["data"]["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["author"], "user");

    // Driver adds a follow-up.
    let resp = driver
        .put(format!("{}/api/support/tickets/{ticket_id}", base_url()))
        .json(&json!({"message": "It failed again this morning"}))
        .send()
        .await
        .expect("ticket update failed");
    assert_eq!(resp.status(), 200);

    // Admin replies; ticket moves to in_progress.
    let admin = admin_client().await;
    let resp = admin
        .post(format!(
            "{}/api/admin/tickets/{ticket_id}/reply",
            base_url()
        ))
        .json(&json!({"message": "We are checking the scanner on that gate"}))
        .send()
        .await
        .expect("reply failed");
    assert_eq!(resp.status(), 200);

    let resp = driver
        .get(format!("{}/api/support/tickets/{ticket_id}", base_url()))
        .send()
        .await
        .expect("ticket read failed");
    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["data"]["status"], "in_progress");
    let messages = body["data"]["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2]["author"], "support");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_short_admin_reply_is_rejected() {
    let (driver, _) = registered_driver().await;
    let (ticket_id, _) = open_ticket(&driver).await;

    let admin = admin_client().await;
    let resp = admin
        .post(format!(
            "{}/api/admin/tickets/{ticket_id}/reply",
            base_url()
        ))
        .json(&json!({"message": "ok"}))
        .send()
        .await
        .expect("reply failed");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_resolving_stamps_resolved_at() {
    let (driver, _) = registered_driver().await;
    let (ticket_id, _) = open_ticket(&driver).await;

    let admin = admin_client().await;
    let resp = admin
        .put(format!(
            "{}/api/admin/tickets/{ticket_id}/status",
            base_url()
        ))
        .json(&json!({"status": "resolved"}))
        .send()
        .await
        .expect("status update failed");
    assert_eq!(resp.status(), 200);

    let resp = driver
        .get(format!("{}/api/support/tickets/{ticket_id}", base_url()))
        .send()
        .await
        .expect("ticket read failed");
    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["data"]["status"], "resolved");
    assert!(!body["data"]["resolved_at"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_tickets_are_private_to_their_owner() {
    let (driver, _) = registered_driver().await;
    let (ticket_id, _) = open_ticket(&driver).await;

    let (stranger, _) = registered_driver().await;
    let resp = stranger
        .get(format!("{}/api/support/tickets/{ticket_id}", base_url()))
        .send()
        .await
        .expect("ticket read failed");
    assert_eq!(resp.status(), 403);
}
