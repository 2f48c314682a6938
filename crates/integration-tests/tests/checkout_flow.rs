//! End-to-end checkout flows against the in-process storefront router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use panier_core::{CheckoutPolicy, DetailsRetention, PaymentGate, UserDetails};
use panier_integration_tests::{TestClient, details_form, valid_details};
use serde_json::json;

fn reconfirm_policy() -> CheckoutPolicy {
    CheckoutPolicy {
        details_retention: DetailsRetention::ReconfirmOnEdit,
        ..CheckoutPolicy::default()
    }
}

async fn add(client: &mut TestClient, product_id: &str, quantity: &str) {
    let response = client
        .post_form(
            "/cart/add",
            &[("product_id", product_id), ("quantity", quantity)],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
}

async fn save_details(client: &mut TestClient, details: &UserDetails) {
    let response = client
        .post_form("/checkout/details", &details_form(details))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
}

// ============================================================================
// Health and pages
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_catalog_page_lists_products() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Olive wood serving board"));
    assert!(response.body.contains("100.00 TND"));

    let csp = response.header("content-security-policy").unwrap();
    assert!(csp.contains("'nonce-"));
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
}

#[tokio::test]
async fn test_empty_checkout() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "empty");
    assert_eq!(snapshot["items"], json!([]));
    assert_eq!(snapshot["pricing"]["subtotal"], "0");
    assert_eq!(snapshot["pricing"]["shippingFee"], "7");
    assert_eq!(snapshot["pricing"]["total"], "7");
    assert_eq!(snapshot["details"], serde_json::Value::Null);
    assert_eq!(snapshot["currency"], "TND");

    let page = client.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your cart is empty"));
}

// ============================================================================
// Cart and pricing
// ============================================================================

#[tokio::test]
async fn test_two_items_price_to_257() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "2").await;
    add(&mut client, "2", "1").await;

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "reviewing");
    assert_eq!(snapshot["items"].as_array().unwrap().len(), 2);
    assert_eq!(snapshot["pricing"]["subtotal"], "250");
    assert_eq!(snapshot["pricing"]["shippingFee"], "7");
    assert_eq!(snapshot["pricing"]["total"], "257");

    let page = client.get("/cart").await;
    assert!(page.body.contains("257.00 TND"));
}

#[tokio::test]
async fn test_large_order_ships_free() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "3", "1").await;

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["pricing"]["subtotal"], "600");
    assert_eq!(snapshot["pricing"]["shippingFee"], "0");
    assert_eq!(snapshot["pricing"]["total"], "600");
}

#[tokio::test]
async fn test_adding_twice_merges_quantity() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;
    add(&mut client, "1", "2").await;

    let snapshot = client.snapshot().await;
    let items = snapshot["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
}

#[tokio::test]
async fn test_quantity_below_one_is_ignored() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "2").await;
    let before = client.snapshot().await;

    for quantity in ["0", "-3"] {
        let response = client
            .post_form(
                "/cart/update",
                &[("product_id", "1"), ("quantity", quantity)],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
    }

    assert_eq!(client.snapshot().await, before);
}

#[tokio::test]
async fn test_update_quantity() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "2", "1").await;

    let response = client
        .htmx_post_form("/cart/update", &[("product_id", "2"), ("quantity", "4")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(response.body.contains("200.00 TND"));

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["pricing"]["total"], "207");
}

#[tokio::test]
async fn test_ignored_update_does_not_trigger() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "2", "1").await;

    let response = client
        .htmx_post_form("/cart/update", &[("product_id", "2"), ("quantity", "0")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("hx-trigger").is_none());
}

#[tokio::test]
async fn test_removing_only_item_empties_cart() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;

    let response = client
        .htmx_post_form("/cart/remove", &[("product_id", "1")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(response.body.contains("Your cart is empty"));

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "empty");
    assert_eq!(snapshot["pricing"]["subtotal"], "0");
    assert_eq!(snapshot["pricing"]["shippingFee"], "7");
    assert_eq!(snapshot["pricing"]["total"], "7");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let response = client
        .post_form("/cart/add", &[("product_id", "99")])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(client.snapshot().await["state"], "empty");
}

#[tokio::test]
async fn test_cart_count_badge() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "2").await;
    add(&mut client, "2", "3").await;

    let response = client.get("/cart/count").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.trim(), "5");
}

#[tokio::test]
async fn test_visitors_have_separate_carts() {
    let mut first = TestClient::new(CheckoutPolicy::default());
    add(&mut first, "1", "1").await;

    let mut second = first.another_visitor();
    assert_eq!(second.snapshot().await["state"], "empty");
    assert_eq!(first.snapshot().await["state"], "reviewing");
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test]
async fn test_saved_details_come_back() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;
    save_details(&mut client, &valid_details()).await;

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "ready");
    assert_eq!(snapshot["details"]["firstName"], "Amira");
    assert_eq!(snapshot["details"]["zipCode"], "10001");
    let details: UserDetails = serde_json::from_value(snapshot["details"].clone()).unwrap();
    assert_eq!(details, valid_details());

    let page = client.get("/cart").await;
    assert!(page.body.contains("value=\"amira@example.tn\""));
}

#[tokio::test]
async fn test_invalid_details_rejected_inline() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;

    let invalid = UserDetails {
        first_name: "A".to_string(),
        email: "not-an-email".to_string(),
        ..valid_details()
    };
    let response = client
        .htmx_post_form("/checkout/details", &details_form(&invalid))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("First name must be at least 2 characters"));
    assert!(response.body.contains("Invalid email address"));
    assert!(!response.body.contains("Invalid zip code"));

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "reviewing");
    assert_eq!(snapshot["details"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_missing_field_rejected_inline() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;

    let mut fields = details_form(&valid_details());
    fields.retain(|(key, _)| *key != "zipCode");
    let response = client.htmx_post_form("/checkout/details", &fields).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid zip code"));
    assert!(response.body.contains("name=\"zipCode\""));
    assert!(response.body.contains("name=\"firstName\""));
    assert!(!response.body.contains("Invalid email address"));

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "reviewing");
    assert_eq!(snapshot["details"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_invalid_details_without_htmx_render_full_page() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let invalid = UserDetails {
        zip_code: "123".to_string(),
        ..valid_details()
    };
    let response = client
        .post_form("/checkout/details", &details_form(&invalid))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("<html"));
    assert!(response.body.contains("Invalid zip code"));
}

#[tokio::test]
async fn test_two_character_first_name_accepted() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;
    save_details(
        &mut client,
        &UserDetails {
            first_name: "Al".to_string(),
            email: "a@b.co".to_string(),
            ..valid_details()
        },
    )
    .await;
    assert_eq!(client.snapshot().await["state"], "ready");
}

// ============================================================================
// Payment gating
// ============================================================================

#[tokio::test]
async fn test_payment_refused_while_reviewing() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;

    let response = client.htmx_post_form::<&str, &str>("/checkout/pay/konnekt", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.body.contains("save your details"));
}

#[tokio::test]
async fn test_payment_refused_when_empty() {
    for gate in [PaymentGate::RequireDetails, PaymentGate::Unrestricted] {
        let mut client = TestClient::new(CheckoutPolicy {
            payment_gate: gate,
            ..CheckoutPolicy::default()
        });
        let response = client.post_form::<&str, &str>("/checkout/pay/cash", &[]).await;
        assert_eq!(response.status, StatusCode::CONFLICT, "{gate:?}");
        assert_eq!(response.body, "Your cart is empty");
    }
}

#[tokio::test]
async fn test_unrestricted_gate_allows_reviewing() {
    let mut client = TestClient::new(CheckoutPolicy {
        payment_gate: PaymentGate::Unrestricted,
        ..CheckoutPolicy::default()
    });
    add(&mut client, "1", "2").await;
    add(&mut client, "2", "1").await;

    let response = client.htmx_post_form::<&str, &str>("/checkout/pay/cash", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Cash on delivery requested"));
    assert!(response.body.contains("257.00 TND"));
}

#[tokio::test]
async fn test_ready_checkout_can_pay_either_way() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;
    save_details(&mut client, &valid_details()).await;

    let response = client.htmx_post_form::<&str, &str>("/checkout/pay/konnekt", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Konnekt payment requested"));

    let response = client.post_form::<&str, &str>("/checkout/pay/cash", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<html"));
    assert!(response.body.contains("107.00 TND"));
}

#[tokio::test]
async fn test_unknown_payment_method() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    let response = client.post_form::<&str, &str>("/checkout/pay/bitcoin", &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Details retention
// ============================================================================

#[tokio::test]
async fn test_cart_edit_keeps_details_by_default() {
    let mut client = TestClient::new(CheckoutPolicy::default());
    add(&mut client, "1", "1").await;
    save_details(&mut client, &valid_details()).await;
    add(&mut client, "2", "1").await;

    assert_eq!(client.snapshot().await["state"], "ready");
}

#[tokio::test]
async fn test_cart_edit_requires_reconfirmation() {
    let mut client = TestClient::new(reconfirm_policy());
    add(&mut client, "1", "1").await;
    save_details(&mut client, &valid_details()).await;
    assert_eq!(client.snapshot().await["state"], "ready");

    let response = client
        .post_form("/cart/update", &[("product_id", "1"), ("quantity", "2")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot["state"], "reviewing");
    assert_eq!(snapshot["details"]["firstName"], "Amira");

    let page = client.get("/cart").await;
    assert!(page.body.contains("Please confirm your details again"));

    let response = client.post_form::<&str, &str>("/checkout/pay/konnekt", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    save_details(&mut client, &valid_details()).await;
    assert_eq!(client.snapshot().await["state"], "ready");
}
