// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a cart into a hosted checkout session.

use std::collections::BTreeMap;
use std::sync::Arc;

use crabtree_core::types::{CheckoutLineItem, CheckoutSessionRequest};
use crabtree_core::{CatalogStore, OrderLine, PaymentGateway, ProductId, ProductStatus, ShopError};
use crabtree_payments::{CART_ITEMS_KEY, ORDER_TYPE_KEY};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Placeholder the gateway substitutes with the real session id on redirect.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// One cart line as the browser submits it. Only the product id is read;
/// everything else about the product comes from the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub product: ProductRef,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
}

impl CheckoutItem {
    pub fn new(id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product: ProductRef {
                id: ProductId(id.into()),
            },
            quantity,
        }
    }
}

/// A session the shopper can be redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: Option<String>,
}

/// Validates carts against live stock and opens gateway sessions.
#[derive(Clone)]
pub struct CheckoutBuilder {
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    public_url: String,
}

impl CheckoutBuilder {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            currency: currency.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Check every line against the catalog and open a checkout session.
    ///
    /// The whole request fails on the first unavailable or understocked
    /// product. Stock is read at a single point in time; nothing is reserved.
    pub async fn create_session(&self, items: &[CheckoutItem]) -> Result<CheckoutSession, ShopError> {
        let lines = merge_lines(items)?;

        let mut line_items = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .catalog
                .get_product(&line.id)
                .await?
                .filter(|p| p.status == ProductStatus::Active)
                .ok_or_else(|| {
                    ShopError::Validation(format!("product {} is not available", line.id))
                })?;

            if !product.has_stock_for(line.quantity) {
                let available = product.inventory_count.unwrap_or_default();
                warn!(
                    product_id = %product.id,
                    requested = line.quantity,
                    available,
                    "checkout rejected: insufficient stock"
                );
                return Err(ShopError::Stock {
                    product_id: product.id.to_string(),
                    product_name: product.name,
                    requested: line.quantity,
                    available,
                });
            }

            line_items.push(CheckoutLineItem {
                name: product.name,
                description: product.description,
                image_url: product.image_url,
                unit_amount: product.price_cents.minor(),
                quantity: line.quantity,
            });
        }

        let cart_items = serde_json::to_string(&lines)
            .map_err(|e| ShopError::Internal(format!("cannot encode cart metadata: {e}")))?;
        let metadata = BTreeMap::from([
            (CART_ITEMS_KEY.to_string(), cart_items),
            (ORDER_TYPE_KEY.to_string(), "online".to_string()),
        ]);

        let request = CheckoutSessionRequest {
            currency: self.currency.clone(),
            line_items,
            success_url: format!("{}/success?session_id={SESSION_ID_PLACEHOLDER}", self.public_url),
            cancel_url: format!("{}/cart", self.public_url),
            metadata,
        };

        let created = self.gateway.create_checkout_session(&request).await?;
        info!(session_id = %created.id, lines = lines.len(), "checkout session created");
        Ok(CheckoutSession {
            session_id: created.id,
            url: created.url,
        })
    }
}

/// Validate quantities and fold repeated products into one line, keeping
/// first-seen order.
fn merge_lines(items: &[CheckoutItem]) -> Result<Vec<OrderLine>, ShopError> {
    if items.is_empty() {
        return Err(ShopError::Validation("cart is empty".into()));
    }

    let mut lines: Vec<OrderLine> = Vec::with_capacity(items.len());
    for item in items {
        let quantity = u32::try_from(item.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                ShopError::Validation(format!(
                    "quantity for product {} must be a positive integer, got {}",
                    item.product.id, item.quantity
                ))
            })?;
        match lines.iter_mut().find(|l| l.id == item.product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => lines.push(OrderLine {
                id: item.product.id.clone(),
                quantity,
            }),
        }
    }
    Ok(lines)
}
