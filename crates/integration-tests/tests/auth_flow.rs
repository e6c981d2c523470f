//! Authentication flow tests.
//!
//! Require a running server and migrated database.
//!
//! Run with: `cargo test -p lotkeeper-integration-tests -- --ignored`

use serde_json::{Value, json};
use uuid::Uuid;

use lotkeeper_integration_tests::{base_url, client, registered_driver};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_register_login_me_logout() {
    let (c, email) = registered_driver().await;

    // Registration established a session.
    let resp = c
        .get(format!("{}/api/auth/me", base_url()))
        .send()
        .await
        .expect("me failed");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["role"], "driver");

    // Logout destroys it.
    let resp = c
        .post(format!("{}/api/auth/logout", base_url()))
        .send()
        .await
        .expect("logout failed");
    assert_eq!(resp.status(), 200);

    let resp = c
        .get(format!("{}/api/auth/me", base_url()))
        .send()
        .await
        .expect("me failed");
    assert_eq!(resp.status(), 401);

    // Login works again with the same credentials.
    let resp = c
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "integration-test-pw"}))
        .send()
        .await
        .expect("login failed");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_wrong_password_is_unauthorized() {
    let (_, email) = registered_driver().await;

    let fresh = client();
    let resp = fresh
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "not-the-password"}))
        .send()
        .await
        .expect("login failed");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_email_conflicts() {
    let (_, email) = registered_driver().await;

    let resp = client()
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "password": "another-password",
            "full_name": "Duplicate",
        }))
        .send()
        .await
        .expect("register failed");
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_driver_cannot_reach_admin_routes() {
    let (c, _email) = registered_driver().await;

    let resp = c
        .get(format!("{}/api/admin/analytics", base_url()))
        .send()
        .await
        .expect("analytics failed");
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_anonymous_requests_are_rejected() {
    let fresh = client();

    let resp = fresh
        .get(format!("{}/api/sessions", base_url()))
        .send()
        .await
        .expect("sessions failed");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_forgot_password_does_not_reveal_accounts() {
    let c = client();
    let url = format!("{}/api/auth/forgot-password", base_url());

    let known = registered_driver().await.1;
    let unknown = format!("nobody-{}@test.lotkeeper.dev", Uuid::new_v4().simple());

    for email in [known, unknown] {
        let resp = c
            .post(&url)
            .json(&json!({"email": email}))
            .send()
            .await
            .expect("forgot-password failed");
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.expect("not JSON");
        assert_eq!(body["success"], true);
    }
}
