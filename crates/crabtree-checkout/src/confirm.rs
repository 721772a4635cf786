// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment confirmation: verify a gateway notification and reconcile stock.

use std::sync::Arc;

use crabtree_core::types::{ConfirmedCheckout, ReconcileOutcome, StockAdjustment};
use crabtree_core::{OrderLedger, ShopError};
use crabtree_payments::{SignatureVerifier, WebhookEvent};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a notification led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// Not a checkout completion; acknowledged and dropped.
    Ignored { event_type: String },
    /// The session was already reconciled by an earlier delivery.
    Duplicate { session_id: String },
    /// Stock was reconciled for the session.
    Applied {
        session_id: String,
        adjustments: Vec<StockAdjustment>,
    },
}

/// Handles asynchronous payment-completion notifications.
#[derive(Clone)]
pub struct ConfirmationHandler {
    ledger: Arc<dyn OrderLedger>,
    verifier: Option<SignatureVerifier>,
}

impl ConfirmationHandler {
    /// `verifier` is `None` when no webhook secret is configured, in which
    /// case every payload is trusted.
    pub fn new(ledger: Arc<dyn OrderLedger>, verifier: Option<SignatureVerifier>) -> Self {
        Self { ledger, verifier }
    }

    pub async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<ConfirmationOutcome, ShopError> {
        match &self.verifier {
            Some(verifier) => {
                let header = signature
                    .ok_or_else(|| ShopError::Authenticity("missing signature header".into()))?;
                verifier.verify(payload, header).inspect_err(|e| {
                    warn!(error = %e, "rejected webhook with bad signature");
                })?;
            }
            None => warn!("webhook secret not configured; accepting unsigned notification"),
        }

        let event = WebhookEvent::parse(payload)?;
        if !event.is_checkout_completed() {
            debug!(event_id = %event.id, event_type = %event.event_type, "ignoring webhook event");
            return Ok(ConfirmationOutcome::Ignored {
                event_type: event.event_type,
            });
        }

        let session = event.checkout_session()?;
        let lines = match session.order_lines() {
            Ok(Some(lines)) => lines,
            Ok(None) => {
                warn!(session_id = %session.id, "completed checkout has no cart_items metadata");
                Vec::new()
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "completed checkout has unreadable cart_items metadata");
                Vec::new()
            }
        };

        let confirmed = ConfirmedCheckout {
            session_id: session.id.clone(),
            event_id: event.id,
            lines,
        };
        match self.ledger.apply_confirmed_checkout(&confirmed).await? {
            ReconcileOutcome::Duplicate => {
                info!(session_id = %session.id, "checkout already reconciled; skipping");
                Ok(ConfirmationOutcome::Duplicate {
                    session_id: session.id,
                })
            }
            ReconcileOutcome::Applied { adjustments } => {
                log_adjustments(&session.id, &adjustments);
                Ok(ConfirmationOutcome::Applied {
                    session_id: session.id,
                    adjustments,
                })
            }
        }
    }
}

fn log_adjustments(session_id: &str, adjustments: &[StockAdjustment]) {
    for adjustment in adjustments {
        match adjustment {
            StockAdjustment::Decremented {
                product_id,
                remaining,
            } => debug!(session_id, %product_id, remaining, "stock decremented"),
            StockAdjustment::Clamped {
                product_id,
                shortfall,
            } => warn!(session_id, %product_id, shortfall, "oversold: stock clamped at zero"),
            StockAdjustment::Untracked { product_id } => {
                debug!(session_id, %product_id, "untracked stock left unchanged")
            }
            StockAdjustment::Missing { product_id } => {
                warn!(session_id, %product_id, "paid product no longer in catalog")
            }
        }
    }
    info!(session_id, lines = adjustments.len(), "checkout reconciled");
}
