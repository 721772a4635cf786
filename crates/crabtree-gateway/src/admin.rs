// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP handlers. Everything except [`login`] sits behind
//! [`admin_auth_middleware`](crate::auth::admin_auth_middleware).

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use crabtree_core::types::{ProductInput, ProductPatch};
use crabtree_core::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::{ProductListResponse, ProductResponse};
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
}

/// POST /api/admin/auth
pub async fn login(
    State(state): State<GatewayState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = body?;
    if !state.admin_auth.is_configured() {
        return Err(ApiError::Misconfigured("admin.password"));
    }
    if !state.admin_auth.verify(&request.password) {
        tracing::warn!("admin login failed");
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/admin/products
///
/// Every product regardless of status.
pub async fn list_products(
    State(state): State<GatewayState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.catalog.all_products().await?;
    Ok(Json(ProductListResponse {
        success: true,
        count: products.len(),
        products,
    }))
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<GatewayState>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body?;
    let product = state.admin.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// PUT /api/admin/products/{id}
pub async fn update_product(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    let Json(patch) = body?;
    let product = state.admin.update(&ProductId(id), patch).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// DELETE /api/admin/products/{id}
pub async fn delete_product(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.admin.delete(&ProductId(id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/admin/products/{id}/toggle-status
pub async fn toggle_status(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.admin.toggle_status(&ProductId(id)).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// POST /api/admin/products/{id}/toggle-featured
pub async fn toggle_featured(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.admin.toggle_featured(&ProductId(id)).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// POST /api/admin/uploads?filename=…
///
/// The raw request body is the image; its type comes from `Content-Type`.
pub async fn upload_image(
    State(state): State<GatewayState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let filename = query.filename.unwrap_or_default();
    let url = state
        .admin
        .upload_image(&filename, content_type, body.to_vec())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse { success: true, url }),
    ))
}
