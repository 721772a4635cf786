// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Crabtree storefront.

use thiserror::Error;

/// The primary error type used across all Crabtree adapter traits and services.
///
/// Variants map one-to-one onto the failure classes callers need to tell
/// apart: configuration problems fail fast at startup, validation and stock
/// failures are the caller's fault, data-access and gateway failures are
/// infrastructure faults. Nothing in the core retries automatically.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Missing or invalid configuration (secrets, URLs, paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad caller input. No partial effect was applied.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The data store is unreachable or a query failed.
    #[error("data access error: {source}")]
    DataAccess {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An inbound notification failed signature verification.
    #[error("authenticity check failed: {0}")]
    Authenticity(String),

    /// Requested quantity exceeds available stock for one product.
    #[error(
        "insufficient stock for {product_name} ({product_id}): requested {requested}, available {available}"
    )]
    Stock {
        product_id: String,
        product_name: String,
        requested: u32,
        available: u32,
    },

    /// The payment provider call failed.
    #[error("payment gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Object storage (product images) failed.
    #[error("object storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Wraps any error as a data-access failure.
    pub fn data_access(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ShopError::DataAccess {
            source: source.into(),
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Stock failures name the offending product and validation failures
    /// carry their detail. Everything else collapses to a generic message so
    /// gateway and database internals never leak.
    pub fn user_message(&self) -> String {
        match self {
            ShopError::Validation(msg) => msg.clone(),
            ShopError::NotFound { entity, id } => format!("{entity} not found: {id}"),
            ShopError::Stock {
                product_name,
                requested,
                available,
                ..
            } => format!(
                "{product_name} is out of stock (requested {requested}, available {available})"
            ),
            ShopError::Authenticity(_) => "invalid signature".to_string(),
            ShopError::Gateway { .. } => "Failed to create checkout session".to_string(),
            _ => "internal server error".to_string(),
        }
    }
}
