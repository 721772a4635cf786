// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted checkout API.
//!
//! [`HttpPaymentGateway`] opens checkout sessions with
//! `POST {api_base}/checkout/sessions`, authenticated with the secret key as a
//! bearer token. It never retries: a failed session creation is reported to
//! the shopper, who can simply try again.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use crabtree_config::model::PaymentsConfig;
use crabtree_core::types::{CheckoutSessionCreated, CheckoutSessionRequest};
use crabtree_core::{Adapter, HealthStatus, PaymentGateway, ShopError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SessionBody<'a> {
    mode: &'static str,
    currency: &'a str,
    line_items: Vec<LineItemBody<'a>>,
    success_url: &'a str,
    cancel_url: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct LineItemBody<'a> {
    price_data: PriceData<'a>,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct PriceData<'a> {
    currency: &'a str,
    unit_amount: i64,
    product_data: ProductData<'a>,
}

#[derive(Debug, Serialize)]
struct ProductData<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Hosted-checkout gateway reached over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    sessions_url: String,
}

impl HttpPaymentGateway {
    /// Build a client from configuration. Fails if no secret key is set.
    pub fn new(config: &PaymentsConfig) -> Result<Self, ShopError> {
        let secret_key = config
            .secret_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ShopError::Config("payments.secret_key is not set".into()))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {secret_key}"))
            .map_err(|e| ShopError::Config(format!("invalid payments.secret_key: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShopError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            sessions_url: format!("{}/checkout/sessions", config.api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Adapter for HttpPaymentGateway {
    fn name(&self) -> &str {
        "hosted-checkout"
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionCreated, ShopError> {
        let body = SessionBody {
            mode: "payment",
            currency: &request.currency,
            line_items: request
                .line_items
                .iter()
                .map(|item| LineItemBody {
                    price_data: PriceData {
                        currency: &request.currency,
                        unit_amount: item.unit_amount,
                        product_data: ProductData {
                            name: &item.name,
                            description: &item.description,
                            images: if item.image_url.is_empty() {
                                Vec::new()
                            } else {
                                vec![item.image_url.as_str()]
                            },
                        },
                    },
                    quantity: item.quantity,
                })
                .collect(),
            success_url: &request.success_url,
            cancel_url: &request.cancel_url,
            metadata: &request.metadata,
        };

        let response = self
            .client
            .post(&self.sessions_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "checkout session request failed");
                ShopError::Gateway {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(status = %status, "checkout session response received");

        let text = response.text().await.map_err(|e| ShopError::Gateway {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|r| r.error.message)
                .unwrap_or(text);
            warn!(status = %status, detail = %detail, "gateway rejected checkout session");
            return Err(ShopError::Gateway {
                message: format!("gateway returned {status}: {detail}"),
                source: None,
            });
        }

        serde_json::from_str::<CheckoutSessionCreated>(&text).map_err(|e| ShopError::Gateway {
            message: format!("failed to parse gateway response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
