// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart store: reducer state plus write-through snapshot persistence.

use crabtree_core::{OrderLedger, Product, ProductId, ShopError};
use tracing::{debug, info, warn};

use crate::cart::{Cart, CartAction, reduce};
use crate::snapshot::SnapshotStore;

/// Owns one cart and keeps its snapshot current.
///
/// The snapshot is loaded once in [`CartStore::open`] and rewritten after
/// every action, before the action returns.
pub struct CartStore<S: SnapshotStore> {
    cart: Cart,
    snapshots: S,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Load the persisted cart, falling back to an empty one if the snapshot
    /// is missing, unreadable, or corrupt.
    pub fn open(snapshots: S) -> Self {
        let loaded = match snapshots.load() {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "discarding corrupt cart snapshot");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "cart snapshot unavailable, starting empty");
                Cart::new()
            }
        };
        let cart = reduce(Cart::new(), CartAction::Load(loaded));
        debug!(lines = cart.items().len(), "cart loaded");
        Self { cart, snapshots }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Apply `action` and persist the result.
    ///
    /// The in-memory cart advances even if the snapshot write fails; the
    /// error is returned so the caller can surface it.
    pub fn dispatch(&mut self, action: CartAction) -> Result<&Cart, ShopError> {
        let current = std::mem::take(&mut self.cart);
        self.cart = reduce(current, action);
        let snapshot = serde_json::to_string(&self.cart)
            .map_err(|e| ShopError::Internal(format!("cannot serialize cart: {e}")))?;
        self.snapshots.save(&snapshot)?;
        Ok(&self.cart)
    }

    pub fn add(&mut self, product: Product, quantity: i64) -> Result<&Cart, ShopError> {
        self.dispatch(CartAction::Add { product, quantity })
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<&Cart, ShopError> {
        self.dispatch(CartAction::Remove { product_id })
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<&Cart, ShopError> {
        self.dispatch(CartAction::SetQuantity {
            product_id,
            quantity,
        })
    }

    pub fn clear(&mut self) -> Result<&Cart, ShopError> {
        self.dispatch(CartAction::Clear)
    }

    pub fn refresh(&mut self, products: Vec<Product>) -> Result<&Cart, ShopError> {
        self.dispatch(CartAction::Refresh(products))
    }

    /// Empty the cart once the payment for `session_id` has been reconciled.
    ///
    /// Returns whether the cart was cleared. An unconfirmed session leaves
    /// the cart untouched so the shopper can retry checkout.
    pub async fn confirm_payment(
        &mut self,
        ledger: &dyn OrderLedger,
        session_id: &str,
    ) -> Result<bool, ShopError> {
        if !ledger.is_processed(session_id).await? {
            debug!(session_id, "payment not confirmed yet; keeping cart");
            return Ok(false);
        }
        self.clear()?;
        info!(session_id, "payment confirmed; cart cleared");
        Ok(true)
    }

    pub fn into_snapshots(self) -> S {
        self.snapshots
    }
}
