// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart state and the pure reducer that drives it.
//!
//! A [`Cart`] is only ever changed by [`reduce`]. Totals are derived from the
//! lines after every action and are never read back from a snapshot.

use crabtree_core::{Price, Product, ProductId};
use serde::{Deserialize, Serialize};

/// One cart line: a product snapshot and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id, `<product id>-<insertion millis>`.
    pub id: String,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    fn new(product: Product, quantity: u32) -> Self {
        let id = format!("{}-{}", product.id, chrono::Utc::now().timestamp_millis());
        Self {
            id,
            product,
            quantity,
        }
    }

    pub fn line_total(&self) -> Price {
        self.product.price_cents.times(self.quantity)
    }
}

/// Ordered cart lines plus their derived totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    item_count: u32,
}

/// Persisted form. Totals may be present but are ignored on load.
#[derive(Deserialize)]
struct CartSnapshot {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = CartSnapshot::deserialize(deserializer)?;
        Ok(Cart::from_items(snapshot.items))
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw lines, dropping empty lines and merging
    /// duplicate products into the first occurrence.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            match merged.iter_mut().find(|m| m.product.id == item.product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity)
                }
                None => merged.push(item),
            }
        }
        let mut cart = Cart {
            items: merged,
            ..Cart::default()
        };
        cart.recompute();
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of price times quantity over all lines, in minor units.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product.id == product_id)
    }

    fn recompute(&mut self) {
        self.total = self.items.iter().map(CartItem::line_total).sum();
        self.item_count = self
            .items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity));
    }
}

/// Everything that can happen to a cart.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add `quantity` of `product`; accumulates onto an existing line.
    Add { product: Product, quantity: i64 },
    Remove { product_id: ProductId },
    /// Set a line's quantity; zero or less removes the line.
    SetQuantity { product_id: ProductId, quantity: i64 },
    Clear,
    /// Replace state with a previously persisted cart.
    Load(Cart),
    /// Re-resolve product snapshots against current catalog data. Lines whose
    /// product is absent from `products` are dropped.
    Refresh(Vec<Product>),
}

impl CartAction {
    pub fn add(product: Product) -> Self {
        CartAction::Add {
            product,
            quantity: 1,
        }
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(u32::MAX)
}

/// Apply `action` to `cart`, returning the next state.
pub fn reduce(mut cart: Cart, action: CartAction) -> Cart {
    match action {
        CartAction::Add { product, quantity } => {
            if quantity <= 0 {
                return cart;
            }
            let quantity = clamp_quantity(quantity);
            match cart.items.iter_mut().find(|i| i.product.id == product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(quantity)
                }
                None => cart.items.push(CartItem::new(product, quantity)),
            }
        }
        CartAction::Remove { product_id } => {
            cart.items.retain(|i| i.product.id != product_id);
        }
        CartAction::SetQuantity {
            product_id,
            quantity,
        } => {
            if quantity <= 0 {
                cart.items.retain(|i| i.product.id != product_id);
            } else if let Some(item) = cart.items.iter_mut().find(|i| i.product.id == product_id) {
                item.quantity = clamp_quantity(quantity);
            }
        }
        CartAction::Clear => return Cart::default(),
        CartAction::Load(loaded) => return Cart::from_items(loaded.items),
        CartAction::Refresh(products) => {
            cart.items = cart
                .items
                .into_iter()
                .filter_map(|mut item| {
                    let current = products.iter().find(|p| p.id == item.product.id)?;
                    item.product = current.clone();
                    Some(item)
                })
                .collect();
        }
    }
    cart.recompute();
    cart
}
