//! Integration tests for cart reconciliation over HTTP.
//!
//! Each `TestApp` is one browser. The session cookie carries the guest cart
//! token and, after sign-in, the user identity.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use fitment_forge_integration_tests::TestApp;

fn amount(body: &Value) -> Decimal {
    body["cart"]["total_price"]["amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

fn quantity_of(body: &Value, product: &str) -> Option<u64> {
    body["cart"]["lines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|line| line["product_id"] == product)
        .and_then(|line| line["quantity"].as_u64())
}

// =============================================================================
// Guest carts
// =============================================================================

#[tokio::test]
async fn test_guest_cart_persists_across_requests() {
    let mut app = TestApp::new();

    let first = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "brake-pad-01", "quantity": 2, "price": "10.00" }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.notice_titles(), vec!["Added to cart"]);
    assert_eq!(first.body["cart"]["owner"]["kind"], "guest");
    let guest = first.body["cart"]["owner"]["id"].clone();

    // Same product merges into the existing line.
    let second = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "brake-pad-01", "price": "10.00" }),
        )
        .await;
    assert_eq!(quantity_of(&second.body, "brake-pad-01"), Some(3));

    let shown = app.get("/api/cart").await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["cart"]["owner"]["id"], guest);
    assert_eq!(shown.body["cart"]["total_quantity"], 3);
    assert_eq!(amount(&shown.body), Decimal::from(30));
    assert_eq!(shown.body["cart"]["sync_status"], "idle");
    assert!(shown.notice_titles().is_empty());

    assert_eq!(app.carts.len().await, 1);
}

#[tokio::test]
async fn test_new_browser_gets_its_own_cart() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "oil-filter", "price": "7.50" }),
    )
    .await;

    app.clear_cookies();
    let fresh = app.get("/api/cart").await;
    assert_eq!(fresh.body["cart"]["lines"], json!([]));
    assert_eq!(fresh.body["cart"]["total_quantity"], 0);
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "spark-plug", "quantity": 4, "price": "3.25" }),
    )
    .await;
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "wiper-blade", "price": "12.00" }),
    )
    .await;

    let updated = app
        .patch("/api/cart/items/spark-plug", &json!({ "quantity": 8 }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(quantity_of(&updated.body, "spark-plug"), Some(8));
    assert_eq!(amount(&updated.body), Decimal::new(3800, 2));

    // Zero removes the line.
    let zeroed = app
        .patch("/api/cart/items/wiper-blade", &json!({ "quantity": 0 }))
        .await;
    assert_eq!(quantity_of(&zeroed.body, "wiper-blade"), None);

    let removed = app.delete("/api/cart/items/spark-plug").await;
    assert_eq!(removed.notice_titles(), vec!["Removed from cart"]);
    assert_eq!(removed.body["cart"]["lines"], json!([]));
}

#[tokio::test]
async fn test_update_of_missing_line_is_a_no_op() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "air-filter", "price": "15.00" }),
    )
    .await;

    let response = app
        .patch("/api/cart/items/not-in-cart", &json!({ "quantity": 5 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cart"]["lines"].as_array().unwrap().len(), 1);
    assert_eq!(quantity_of(&response.body, "not-in-cart"), None);
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "headlight", "quantity": 2, "price": "45.00" }),
    )
    .await;

    let cleared = app.delete("/api/cart").await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["cart"]["lines"], json!([]));

    let shown = app.get("/api/cart").await;
    assert_eq!(shown.body["cart"]["total_quantity"], 0);
}

#[tokio::test]
async fn test_invalid_lines_are_rejected() {
    let mut app = TestApp::new();

    let zero = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "rotor", "quantity": 0, "price": "60.00" }),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let negative = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "rotor", "price": "-1.00" }),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let huge = app
        .patch(
            "/api/cart/items/rotor",
            &json!({ "quantity": i64::from(u32::MAX) + 1 }),
        )
        .await;
    assert_eq!(huge.status, StatusCode::BAD_REQUEST);

    assert!(app.carts.is_empty().await);
}

#[tokio::test]
async fn test_overflowing_total_is_rejected() {
    let mut app = TestApp::new();
    let max = Decimal::MAX.to_string();

    let response = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "crate-engine", "quantity": 2, "price": max }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "cart total is too large");
    assert!(app.carts.is_empty().await);

    let single = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "crate-engine", "price": max }),
        )
        .await;
    assert_eq!(single.status, StatusCode::OK);

    let doubled = app
        .patch("/api/cart/items/crate-engine", &json!({ "quantity": 2 }))
        .await;
    assert_eq!(doubled.status, StatusCode::BAD_REQUEST);

    let shown = app.get("/api/cart").await;
    assert_eq!(quantity_of(&shown.body, "crate-engine"), Some(1));
}

// =============================================================================
// Identity changes
// =============================================================================

#[tokio::test]
async fn test_sign_in_switches_to_user_cart() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "guest-item", "price": "5.00" }),
    )
    .await;

    let user_id = app.sign_up_and_in("driver@example.com", "torque-wrench-42").await;

    // Guest lines are not merged into the user's cart.
    let signed_in = app.get("/api/cart").await;
    assert_eq!(signed_in.body["cart"]["owner"]["kind"], "user");
    assert_eq!(signed_in.body["cart"]["owner"]["id"], user_id.as_str());
    assert_eq!(signed_in.body["cart"]["lines"], json!([]));

    app.post(
        "/api/cart/items",
        &json!({ "product_id": "user-item", "quantity": 2, "price": "8.00" }),
    )
    .await;

    // Signing out returns to the guest cart, which kept its line.
    let signed_out = app.post("/api/auth/signout", &json!({})).await;
    assert_eq!(signed_out.status, StatusCode::OK);
    let guest = app.get("/api/cart").await;
    assert_eq!(guest.body["cart"]["owner"]["kind"], "guest");
    assert_eq!(quantity_of(&guest.body, "guest-item"), Some(1));
    assert_eq!(quantity_of(&guest.body, "user-item"), None);

    // Signing back in finds the user's cart again.
    let again = app
        .post(
            "/api/auth/signin",
            &json!({ "email": "driver@example.com", "password": "torque-wrench-42" }),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
    let user_cart = app.get("/api/cart").await;
    assert_eq!(quantity_of(&user_cart.body, "user-item"), Some(2));
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_save_failure_keeps_lines_and_notifies() {
    let mut app = TestApp::new();
    app.carts.set_fail_writes(true);

    let response = app
        .post(
            "/api/cart/items",
            &json!({ "product_id": "timing-belt", "price": "89.99" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantity_of(&response.body, "timing-belt"), Some(1));
    assert_eq!(response.body["cart"]["sync_status"], "sync_failed");
    assert_eq!(
        response.notice_titles(),
        vec!["Cart sync failed", "Added to cart"]
    );
    assert_eq!(response.body["notices"][0]["variant"], "destructive");
    assert!(app.carts.is_empty().await);
}

#[tokio::test]
async fn test_load_failure_is_silent() {
    let mut app = TestApp::new();
    app.post(
        "/api/cart/items",
        &json!({ "product_id": "fuel-pump", "price": "120.00" }),
    )
    .await;

    app.carts.set_fail_reads(true);
    let response = app.get("/api/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.notice_titles().is_empty());
    assert_eq!(response.body["cart"]["lines"], json!([]));
}
