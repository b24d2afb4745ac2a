//! Integration tests for profile and address book routes.

use axum::http::{StatusCode, header};
use serde_json::{Value, json};

use fitment_forge_integration_tests::TestApp;

fn address(city: &str, is_default: bool) -> Value {
    json!({
        "type": "shipping",
        "first_name": "Alex",
        "last_name": "Moreno",
        "address_line_1": "12 Piston Way",
        "city": city,
        "state": "OH",
        "postal_code": "43004",
        "country": "US",
        "is_default": is_default
    })
}

#[tokio::test]
async fn test_account_routes_require_auth() {
    let mut app = TestApp::new();
    let response = app.get("/api/account/addresses").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Authentication required");
}

#[tokio::test]
async fn test_profile_update_keeps_omitted_fields() {
    let mut app = TestApp::new();
    app.post(
        "/api/auth/signup",
        &json!({
            "email": "owner@example.com",
            "password": "radiator-cap-9",
            "first_name": "Alex",
            "phone": "555-0100"
        }),
    )
    .await;
    app.post(
        "/api/auth/signin",
        &json!({ "email": "owner@example.com", "password": "radiator-cap-9" }),
    )
    .await;

    let updated = app
        .patch("/api/account/profile", &json!({ "last_name": "Moreno" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.notice_titles(), vec!["Profile updated!"]);
    assert_eq!(updated.body["profile"]["first_name"], "Alex");
    assert_eq!(updated.body["profile"]["last_name"], "Moreno");
    assert_eq!(updated.body["profile"]["phone"], "555-0100");
}

#[tokio::test]
async fn test_address_crud() {
    let mut app = TestApp::new();
    app.sign_up_and_in("owner@example.com", "radiator-cap-9").await;

    let created = app
        .post("/api/account/addresses", &address("Columbus", true))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["address"]["type"], "shipping");
    let first_id = created.body["address"]["id"].as_str().unwrap().to_string();

    // A new default of the same kind takes over.
    let second = app
        .post("/api/account/addresses", &address("Dayton", true))
        .await;
    let second_id = second.body["address"]["id"].as_str().unwrap().to_string();

    let listed = app.get("/api/account/addresses").await;
    let addresses = listed.body["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    let defaults: Vec<&str> = addresses
        .iter()
        .filter(|a| a["is_default"] == true)
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert_eq!(defaults, vec![second_id.as_str()]);

    let replaced = app
        .put(
            &format!("/api/account/addresses/{first_id}"),
            &address("Toledo", false),
        )
        .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(replaced.body["address"]["city"], "Toledo");

    let deleted = app
        .delete(&format!("/api/account/addresses/{first_id}"))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.notice_titles(), vec!["Address deleted"]);

    let gone = app
        .delete(&format!("/api/account/addresses/{first_id}"))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["notices"][0]["variant"], "destructive");
}

#[tokio::test]
async fn test_missing_address_fields_are_named() {
    let mut app = TestApp::new();
    app.sign_up_and_in("owner@example.com", "radiator-cap-9").await;

    let mut incomplete = address("", false);
    incomplete["postal_code"] = json!("  ");
    let response = app.post("/api/account/addresses", &incomplete).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.contains("city"));
    assert!(error.contains("postal_code"));
}

#[tokio::test]
async fn test_addresses_are_private() {
    let mut app = TestApp::new();
    app.sign_up_and_in("first@example.com", "radiator-cap-9").await;
    let created = app
        .post("/api/account/addresses", &address("Akron", false))
        .await;
    let id = created.body["address"]["id"].as_str().unwrap().to_string();

    app.clear_cookies();
    app.sign_up_and_in("second@example.com", "radiator-cap-9").await;
    assert_eq!(
        app.get("/api/account/addresses").await.body["addresses"],
        json!([])
    );
    let response = app
        .delete(&format!("/api/account/addresses/{id}"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert_eq!(response.headers[header::X_FRAME_OPTIONS], "DENY");
    assert!(response.headers.contains_key("x-request-id"));
}
