// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests for the storefront HTTP API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use crabtree_core::ProductStatus;
use crabtree_test_utils::TestHarness;
use serde_json::json;

const PASSWORD: &str = "s3cret-admin";
const WEBHOOK_SECRET: &str = "whsec_routes";

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_admin_password(PASSWORD)
        .with_webhook_secret(WEBHOOK_SECRET)
        .build()
        .await
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {PASSWORD}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_lists_adapters() {
    let h = harness().await;
    let (status, body) = h.call(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["adapters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["sqlite", "local-objects", "mock-gateway"]);
    // Uploads directory is only created on first upload.
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn storefront_lists_only_active_products() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, Some(5), ProductStatus::Active)
        .await
        .unwrap();
    h.seed_product("draft", "Draft", 999, None, ProductStatus::Draft)
        .await
        .unwrap();

    let (status, body) = h.call(get("/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["id"], "mug");
    assert_eq!(body["products"][0]["price_cents"], 1250);

    let (status, _) = h.call(get("/api/products/draft")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.call(get("/api/products/mug")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], "Mug");
}

#[tokio::test]
async fn featured_filter_uses_toggled_flag() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, None, ProductStatus::Active)
        .await
        .unwrap();
    h.seed_product("print", "Print", 4000, None, ProductStatus::Active)
        .await
        .unwrap();

    let (status, body) = h
        .call(authed("POST", "/api/admin/products/print/toggle-featured"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["featured"], true);

    let (_, body) = h.call(get("/api/products?featured=true")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["id"], "print");
}

#[tokio::test]
async fn checkout_returns_session_and_maps_stock_errors() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, Some(3), ProductStatus::Active)
        .await
        .unwrap();

    let ok = json!({"items": [{"product": {"id": "mug"}, "quantity": 2}]});
    let (status, body) = h
        .call(TestHarness::json_request("POST", "/api/checkout", &ok, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "cs_mock_1");
    assert_eq!(body["url"], "https://pay.example.test/cs_mock_1");

    let too_many = json!({"items": [{"product": {"id": "mug"}, "quantity": 4}]});
    let (status, body) = h
        .call(TestHarness::json_request("POST", "/api/checkout", &too_many, None))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["product_id"], "mug");
    assert!(body["error"].as_str().unwrap().contains("Mug"));

    let empty = json!({"items": []});
    let (status, _) = h
        .call(TestHarness::json_request("POST", "/api/checkout", &empty, None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.gateway.request_count().await, 1);
}

#[tokio::test]
async fn malformed_checkout_body_is_bad_request() {
    let h = harness().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/checkout")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = h.call(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn gateway_failure_is_bad_gateway_with_generic_message() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, Some(3), ProductStatus::Active)
        .await
        .unwrap();
    h.gateway.set_failing(true);

    let body = json!({"items": [{"product": {"id": "mug"}, "quantity": 1}]});
    let (status, body) = h
        .call(TestHarness::json_request("POST", "/api/checkout", &body, None))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to create checkout session");
}

#[tokio::test]
async fn signed_webhook_decrements_once() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, Some(5), ProductStatus::Active)
        .await
        .unwrap();

    let payload = TestHarness::completed_checkout("cs_web_1", &[("mug", 2)]);
    let (status, body) = h.call(h.webhook_request(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["outcome"]["status"], "applied");
    assert_eq!(body["outcome"]["adjustments"][0]["result"], "decremented");
    assert_eq!(body["outcome"]["adjustments"][0]["remaining"], 3);

    let (status, body) = h.call(h.webhook_request(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "duplicate");
    assert_eq!(h.stock("mug").await.unwrap(), Some(3));
}

#[tokio::test]
async fn unsigned_webhook_is_rejected_when_secret_configured() {
    let h = harness().await;
    h.seed_product("mug", "Mug", 1250, Some(5), ProductStatus::Active)
        .await
        .unwrap();

    let payload = TestHarness::completed_checkout("cs_forged", &[("mug", 5)]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/payment")
        .header("Payment-Signature", "t=1,v1=00")
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = h.call(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid signature");
    assert_eq!(h.stock("mug").await.unwrap(), Some(5));
}

#[tokio::test]
async fn admin_routes_require_bearer_password() {
    let h = harness().await;

    let (status, _) = h.call(get("/api/admin/products")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/api/admin/products")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = h.call(wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = h.call(authed("GET", "/api/admin/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn admin_routes_fail_closed_without_password() {
    let h = TestHarness::builder().build().await.unwrap();
    let (status, _) = h.call(authed("GET", "/api/admin/products")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = json!({"password": PASSWORD});
    let (status, _) = h
        .call(TestHarness::json_request("POST", "/api/admin/auth", &login, None))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn admin_login_checks_password() {
    let h = harness().await;
    let wrong = json!({"password": "guess"});
    let (status, _) = h
        .call(TestHarness::json_request("POST", "/api/admin/auth", &wrong, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let right = json!({"password": PASSWORD});
    let (status, body) = h
        .call(TestHarness::json_request("POST", "/api/admin/auth", &right, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn admin_product_lifecycle() {
    let h = harness().await;

    let input = json!({
        "name": "Walnut Board",
        "price": "49.99",
        "category": "kitchen",
        "inventory_count": 4
    });
    let (status, body) = h
        .call(TestHarness::json_request(
            "POST",
            "/api/admin/products",
            &input,
            Some(PASSWORD),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["price_cents"], 4999);
    assert_eq!(body["product"]["status"], "active");
    let id = body["product"]["id"].as_str().unwrap().to_string();

    let patch = json!({"inventory_count": null, "name": "Walnut Cutting Board"});
    let (status, body) = h
        .call(TestHarness::json_request(
            "PUT",
            &format!("/api/admin/products/{id}"),
            &patch,
            Some(PASSWORD),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], "Walnut Cutting Board");
    assert!(body["product"]["inventory_count"].is_null());
    assert_eq!(body["product"]["category"], "kitchen");

    let (status, body) = h
        .call(authed("POST", &format!("/api/admin/products/{id}/toggle-status")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["status"], "inactive");

    let (status, _) = h
        .call(authed("DELETE", &format!("/api/admin/products/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    // Deleting again is not an error.
    let (status, _) = h
        .call(authed("DELETE", &format!("/api/admin/products/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .call(authed("POST", &format!("/api/admin/products/{id}/toggle-status")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_create_rejects_invalid_input() {
    let h = harness().await;
    for input in [
        json!({"name": "", "price": "1.00"}),
        json!({"name": "Free", "price": "0"}),
        json!({"name": "No price"}),
    ] {
        let (status, body) = h
            .call(TestHarness::json_request(
                "POST",
                "/api/admin/products",
                &input,
                Some(PASSWORD),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "input {input}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn admin_upload_stores_image() {
    let h = harness().await;
    let png = Request::builder()
        .method("POST")
        .uri("/api/admin/uploads?filename=board.png")
        .header("authorization", format!("Bearer {PASSWORD}"))
        .header("content-type", "image/png")
        .body(Body::from(vec![0x89, b'P', b'N', b'G']))
        .unwrap();
    let (status, body) = h.call(png).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://shop.test/uploads/"));
    assert!(url.ends_with(".png"));

    let text = Request::builder()
        .method("POST")
        .uri("/api/admin/uploads?filename=notes.txt")
        .header("authorization", format!("Bearer {PASSWORD}"))
        .header("content-type", "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let (status, _) = h.call(text).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn busy_port_is_reported_as_runtime_failure() {
    let h = harness().await;
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = crabtree_config::model::ServerConfig {
        host: "127.0.0.1".to_string(),
        port: occupied.local_addr().unwrap().port(),
        ..crabtree_config::model::ServerConfig::default()
    };

    let err = crabtree_gateway::start_server(&config, h.state.clone(), std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, crabtree_core::ShopError::Internal(_)));
    assert!(err.to_string().contains("failed to bind"));
}
