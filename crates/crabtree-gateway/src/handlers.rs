// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public HTTP handlers: health, catalog, checkout and payment webhooks.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use crabtree_checkout::{CheckoutItem, CheckoutSession, ConfirmationOutcome};
use crabtree_core::{HealthStatus, Product, ProductId};
use crabtree_payments::SIGNATURE_HEADER;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every adapter is healthy, "degraded" otherwise.
    pub status: &'static str,
    pub uptime_secs: u64,
    pub adapters: Vec<AdapterHealth>,
}

#[derive(Debug, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Query string for GET /api/products.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub count: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

/// Request body for POST /api/checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

/// Response body for POST /api/webhooks/payment.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: ConfirmationOutcome,
}

/// GET /health
///
/// Returns 503 if any adapter reports itself unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> impl IntoResponse {
    let mut adapters = Vec::with_capacity(state.adapters.len());
    let mut unhealthy = false;
    let mut degraded = false;

    for adapter in state.adapters.iter() {
        let (status, detail) = match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => ("healthy", None),
            Ok(HealthStatus::Degraded(reason)) => {
                degraded = true;
                ("degraded", Some(reason))
            }
            Ok(HealthStatus::Unhealthy(reason)) => {
                unhealthy = true;
                ("unhealthy", Some(reason))
            }
            Err(e) => {
                unhealthy = true;
                ("unhealthy", Some(e.to_string()))
            }
        };
        adapters.push(AdapterHealth {
            name: adapter.name().to_string(),
            status,
            detail,
        });
    }

    let code = if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = HealthResponse {
        status: if unhealthy || degraded { "degraded" } else { "ok" },
        uptime_secs: state.started_at.elapsed().as_secs(),
        adapters,
    };
    (code, Json(body))
}

/// GET /api/products
///
/// Active products, newest first. `featured=true` narrows to featured ones;
/// `category` narrows to one category.
pub async fn list_products(
    State(state): State<GatewayState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let products = if query.featured {
        let mut featured = state.catalog.featured_products().await?;
        if let Some(category) = category {
            featured.retain(|p| p.category == category);
        }
        featured
    } else {
        state.catalog.active_products(category).await?
    };

    Ok(Json(ProductListResponse {
        success: true,
        count: products.len(),
        products,
    }))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.active_product(&ProductId(id)).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// POST /api/checkout
pub async fn create_checkout(
    State(state): State<GatewayState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let Json(request) = body?;
    let session = state.checkout.create_session(&request.items).await?;
    Ok(Json(session))
}

/// POST /api/webhooks/payment
///
/// The body is taken raw because the signature covers the exact bytes sent.
pub async fn payment_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state.confirmations.handle(&body, signature).await?;
    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
