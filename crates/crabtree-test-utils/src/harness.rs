// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete storefront stack with a mock payment
//! gateway, a temp SQLite database and a temp uploads directory. Requests
//! are driven through the real axum router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crabtree_catalog::{AdminProducts, CatalogService};
use crabtree_checkout::{CheckoutBuilder, ConfirmationHandler};
use crabtree_config::model::StorageConfig;
use crabtree_core::{
    Adapter, CatalogStore, Price, Product, ProductId, ProductStatus, ShopError, now_timestamp,
};
use crabtree_gateway::{AdminAuth, GatewayState, build_router};
use crabtree_payments::{SIGNATURE_HEADER, SignatureVerifier, sign_payload};
use crabtree_storage::{LocalObjectStore, SqliteStorage};

use crate::mock_gateway::MockPaymentGateway;

/// Public origin used for checkout redirect URLs.
pub const PUBLIC_URL: &str = "http://shop.test";

/// Public prefix uploaded images are served under.
pub const UPLOADS_URL: &str = "http://shop.test/uploads";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    webhook_secret: Option<String>,
    admin_password: Option<String>,
    currency: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            webhook_secret: None,
            admin_password: None,
            currency: "usd".to_string(),
        }
    }

    /// Require signed webhooks with this secret.
    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(secret.to_string());
        self
    }

    /// Unlock the admin API with this password.
    pub fn with_admin_password(mut self, password: &str) -> Self {
        self.admin_password = Some(password.to_string());
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ShopError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ShopError::Storage {
            message: "failed to create temp dir".into(),
            source: Some(Box::new(e)),
        })?;

        let storage_config = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
            uploads_dir: temp_dir.path().join("uploads").to_string_lossy().into_owned(),
            public_base_url: UPLOADS_URL.to_string(),
        };
        let storage = Arc::new(SqliteStorage::new(storage_config.clone()));
        storage.initialize().await?;
        let objects = Arc::new(LocalObjectStore::from_config(&storage_config));
        let gateway = Arc::new(MockPaymentGateway::new());

        let verifier = self
            .webhook_secret
            .as_deref()
            .map(|secret| SignatureVerifier::new(secret, 300));

        let state = GatewayState {
            catalog: CatalogService::new(storage.clone()),
            admin: AdminProducts::new(storage.clone(), objects.clone()),
            checkout: CheckoutBuilder::new(
                storage.clone(),
                gateway.clone(),
                self.currency,
                PUBLIC_URL,
            ),
            confirmations: ConfirmationHandler::new(storage.clone(), verifier),
            admin_auth: AdminAuth::new(self.admin_password),
            adapters: Arc::from(vec![
                storage.clone() as Arc<dyn Adapter>,
                objects as Arc<dyn Adapter>,
                gateway.clone() as Arc<dyn Adapter>,
            ]),
            started_at: Instant::now(),
        };

        Ok(TestHarness {
            state,
            storage,
            gateway,
            webhook_secret: self.webhook_secret,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired storefront over temporary storage.
pub struct TestHarness {
    pub state: GatewayState,
    pub storage: Arc<SqliteStorage>,
    pub gateway: Arc<MockPaymentGateway>,
    webhook_secret: Option<String>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The application router over this harness's state.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Insert a product straight into the catalog.
    pub async fn seed_product(
        &self,
        id: &str,
        name: &str,
        cents: i64,
        inventory: Option<u32>,
        status: ProductStatus,
    ) -> Result<Product, ShopError> {
        let now = now_timestamp();
        let product = Product {
            id: ProductId::from(id),
            name: name.to_string(),
            description: String::new(),
            price_cents: Price::from_minor(cents),
            image_url: String::new(),
            category: String::new(),
            status,
            featured: false,
            inventory_count: inventory,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.insert_product(&product).await?;
        Ok(product)
    }

    /// Current stock for `id`; `None` when untracked or missing.
    pub async fn stock(&self, id: &str) -> Result<Option<u32>, ShopError> {
        Ok(self
            .storage
            .get_product(&ProductId::from(id))
            .await?
            .and_then(|p| p.inventory_count))
    }

    /// Send one request through the router and decode the JSON response.
    ///
    /// Empty or non-JSON bodies decode as `Value::Null`.
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = match self.router().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// A JSON request with an optional admin bearer token.
    pub fn json_request(
        method: &str,
        uri: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder
            .body(Body::from(body.to_string()))
            .unwrap_or_default()
    }

    /// A webhook request, signed when the harness has a webhook secret.
    pub fn webhook_request(&self, payload: &[u8]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/webhooks/payment")
            .header("content-type", "application/json");
        if let Some(secret) = &self.webhook_secret {
            let header = sign_payload(secret, payload, chrono::Utc::now().timestamp());
            builder = builder.header(SIGNATURE_HEADER, header);
        }
        builder
            .body(Body::from(payload.to_vec()))
            .unwrap_or_default()
    }

    /// A `checkout.session.completed` notification for `lines`.
    pub fn completed_checkout(session_id: &str, lines: &[(&str, u32)]) -> Vec<u8> {
        let cart_items: Vec<serde_json::Value> = lines
            .iter()
            .map(|(id, quantity)| serde_json::json!({"id": id, "quantity": quantity}))
            .collect();
        serde_json::json!({
            "id": format!("evt_{session_id}"),
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": session_id,
                "metadata": {
                    "cart_items": serde_json::Value::Array(cart_items).to_string(),
                    "order_type": "online"
                }
            }}
        })
        .to_string()
        .into_bytes()
    }
}
