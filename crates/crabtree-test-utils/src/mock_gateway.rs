// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment gateway for deterministic testing.
//!
//! `MockPaymentGateway` implements `PaymentGateway` without any network
//! access. Session ids are `cs_mock_1`, `cs_mock_2`, … in request order.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crabtree_core::types::{CheckoutSessionCreated, CheckoutSessionRequest};
use crabtree_core::{Adapter, HealthStatus, PaymentGateway, ShopError};

/// A payment gateway that records every session request.
#[derive(Default)]
pub struct MockPaymentGateway {
    requests: Mutex<Vec<CheckoutSessionRequest>>,
    failing: AtomicBool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent session requests fail with a gateway error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every accepted request, oldest first.
    pub async fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl Adapter for MockPaymentGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionCreated, ShopError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ShopError::Gateway {
                message: "gateway returned 503: mock outage".into(),
                source: None,
            });
        }

        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let id = format!("cs_mock_{}", requests.len());
        Ok(CheckoutSessionCreated {
            url: Some(format!("https://pay.example.test/{id}")),
            id,
        })
    }
}
