// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog store trait: the products collection.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::Adapter;
use crate::types::{Product, ProductChanges, ProductFilter, ProductId};

/// Persistence for the products collection.
///
/// Listings are ordered newest first with a stable tie-break, so repeated
/// queries never reorder rows with equal timestamps. Toggles are single
/// atomic statements on the store side, never read-then-write.
#[async_trait]
pub trait CatalogStore: Adapter {
    /// Lists products matching `filter`, newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ShopError>;

    /// Fetches one product by id.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, ShopError>;

    /// Inserts a fully formed product row.
    async fn insert_product(&self, product: &Product) -> Result<(), ShopError>;

    /// Applies `changes` and stamps `updated_at`. Returns `None` if the id is absent.
    async fn update_product(
        &self,
        id: &ProductId,
        changes: &ProductChanges,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError>;

    /// Deletes a product. Returns whether a row was removed.
    async fn delete_product(&self, id: &ProductId) -> Result<bool, ShopError>;

    /// Flips active to inactive and anything else to active.
    async fn toggle_status(
        &self,
        id: &ProductId,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError>;

    /// Negates the featured flag.
    async fn toggle_featured(
        &self,
        id: &ProductId,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError>;
}
