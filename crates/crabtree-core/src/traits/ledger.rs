// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order ledger trait: idempotent inventory reconciliation.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::Adapter;
use crate::types::{ConfirmedCheckout, ReconcileOutcome};

/// Records processed checkout sessions and applies their stock decrements.
///
/// Implementations must make the "already processed?" check, the ledger
/// insert, and every decrement a single atomic unit, so a redelivered
/// notification can never decrement twice.
#[async_trait]
pub trait OrderLedger: Adapter {
    /// Reconciles a completed checkout against inventory exactly once.
    async fn apply_confirmed_checkout(
        &self,
        checkout: &ConfirmedCheckout,
    ) -> Result<ReconcileOutcome, ShopError>;

    /// Whether a session id has already been reconciled.
    async fn is_processed(&self, session_id: &str) -> Result<bool, ShopError>;
}
