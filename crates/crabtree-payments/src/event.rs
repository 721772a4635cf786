// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notification payloads.

use std::collections::BTreeMap;

use crabtree_core::{OrderLine, ShopError};
use serde::Deserialize;

/// Event type emitted when a hosted checkout is paid.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Metadata key holding the `[{"id", "quantity"}]` list attached at checkout.
pub const CART_ITEMS_KEY: &str = "cart_items";

/// Metadata key recording how the order was placed.
pub const ORDER_TYPE_KEY: &str = "order_type";

/// Envelope of every notification the gateway sends.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// Shape depends on `event_type`; decoded on demand.
    pub object: serde_json::Value,
}

/// The checkout session carried by a completion event.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WebhookEvent {
    /// Decode a raw notification body.
    pub fn parse(payload: &[u8]) -> Result<Self, ShopError> {
        serde_json::from_slice(payload)
            .map_err(|e| ShopError::Validation(format!("malformed webhook payload: {e}")))
    }

    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_COMPLETED
    }

    /// The checkout session inside `data.object`.
    pub fn checkout_session(&self) -> Result<CheckoutSessionObject, ShopError> {
        CheckoutSessionObject::deserialize(&self.data.object)
            .map_err(|e| ShopError::Validation(format!("malformed checkout session: {e}")))
    }
}

impl CheckoutSessionObject {
    /// The order lines recorded at checkout.
    ///
    /// `Ok(None)` when the metadata key is absent; `Err` when it is present
    /// but unreadable. Lines with a zero quantity are dropped.
    pub fn order_lines(&self) -> Result<Option<Vec<OrderLine>>, serde_json::Error> {
        let Some(raw) = self.metadata.get(CART_ITEMS_KEY) else {
            return Ok(None);
        };
        let lines: Vec<OrderLine> = serde_json::from_str(raw)?;
        Ok(Some(lines.into_iter().filter(|l| l.quantity > 0).collect()))
    }
}
