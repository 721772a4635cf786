// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crabtree_core::ShopError;
use serde::Serialize;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// Set for stock failures so the client can point at the cart line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    Shop(ShopError),
    Unauthorized,
    /// A server-side setting the endpoint needs is missing.
    Misconfigured(&'static str),
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        ApiError::Shop(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Shop(ShopError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Shop(err) => match err {
                ShopError::Validation(_) | ShopError::Authenticity(_) => StatusCode::BAD_REQUEST,
                ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
                ShopError::Stock { .. } => StatusCode::CONFLICT,
                ShopError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, product_id) = match &self {
            ApiError::Shop(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, status = status.as_u16(), "request failed");
                } else {
                    tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
                }
                let product_id = match err {
                    ShopError::Stock { product_id, .. } => Some(product_id.clone()),
                    _ => None,
                };
                (err.user_message(), product_id)
            }
            ApiError::Unauthorized => ("unauthorized".to_string(), None),
            ApiError::Misconfigured(what) => {
                tracing::error!(setting = what, "endpoint is not configured");
                ("internal server error".to_string(), None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
                product_id,
            }),
        )
            .into_response()
    }
}
