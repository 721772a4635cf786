// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Processed-checkout ledger and inventory decrements.
//!
//! A confirmed checkout is recorded and its stock decrements applied inside one
//! transaction, so a redelivered notification either sees the ledger row and
//! changes nothing, or sees no trace of a previous attempt.

use crabtree_core::types::{ConfirmedCheckout, ReconcileOutcome, StockAdjustment};
use crabtree_core::{OrderLine, ShopError, now_timestamp};
use rusqlite::{OptionalExtension, Transaction, params};

use crate::database::{Database, map_tr_err};

/// Record `checkout` in the ledger and decrement stock for each line.
pub async fn apply_confirmed_checkout(
    db: &Database,
    checkout: &ConfirmedCheckout,
) -> Result<ReconcileOutcome, ShopError> {
    let checkout = checkout.clone();
    let processed_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO processed_checkouts (session_id, event_id, processed_at)
                 VALUES (?1, ?2, ?3)",
                params![checkout.session_id, checkout.event_id, processed_at],
            )?;
            if inserted == 0 {
                return Ok(ReconcileOutcome::Duplicate);
            }

            let mut adjustments = Vec::with_capacity(checkout.lines.len());
            for line in &checkout.lines {
                adjustments.push(decrement(&tx, line, &processed_at)?);
            }
            tx.commit()?;
            Ok(ReconcileOutcome::Applied { adjustments })
        })
        .await
        .map_err(map_tr_err)
}

/// Decrement one product, clamping at zero when stock is short.
fn decrement(
    tx: &Transaction<'_>,
    line: &OrderLine,
    updated_at: &str,
) -> Result<StockAdjustment, rusqlite::Error> {
    let product_id = line.id.clone();
    let quantity = i64::from(line.quantity);

    let changed = tx.execute(
        "UPDATE products
         SET inventory_count = inventory_count - ?1, updated_at = ?3
         WHERE id = ?2 AND inventory_count IS NOT NULL AND inventory_count >= ?1",
        params![quantity, product_id.0, updated_at],
    )?;
    if changed == 1 {
        let remaining: u32 = tx.query_row(
            "SELECT inventory_count FROM products WHERE id = ?1",
            params![product_id.0],
            |row| row.get(0),
        )?;
        return Ok(StockAdjustment::Decremented {
            product_id,
            remaining,
        });
    }

    let current: Option<Option<u32>> = tx
        .query_row(
            "SELECT inventory_count FROM products WHERE id = ?1",
            params![product_id.0],
            |row| row.get(0),
        )
        .optional()?;

    match current {
        None => Ok(StockAdjustment::Missing { product_id }),
        Some(None) => Ok(StockAdjustment::Untracked { product_id }),
        Some(Some(available)) => {
            tx.execute(
                "UPDATE products SET inventory_count = 0, updated_at = ?2 WHERE id = ?1",
                params![product_id.0, updated_at],
            )?;
            Ok(StockAdjustment::Clamped {
                product_id,
                shortfall: line.quantity.saturating_sub(available),
            })
        }
    }
}

/// Whether `session_id` has already been reconciled.
pub async fn is_processed(db: &Database, session_id: &str) -> Result<bool, ShopError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM processed_checkouts WHERE session_id = ?1)",
                params![session_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
