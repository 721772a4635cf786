// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only product queries for the storefront.

use std::sync::Arc;

use crabtree_core::{CatalogStore, Product, ProductFilter, ProductId, ProductStatus, ShopError};

/// Storefront view of the catalog.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Every product regardless of status, newest first.
    pub async fn all_products(&self) -> Result<Vec<Product>, ShopError> {
        self.store.list_products(&ProductFilter::all()).await
    }

    /// Active products, newest first, optionally limited to one category.
    pub async fn active_products(&self, category: Option<&str>) -> Result<Vec<Product>, ShopError> {
        let mut filter = ProductFilter::active();
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            filter = filter.with_category(category);
        }
        self.store.list_products(&filter).await
    }

    /// Active and featured products, newest first.
    pub async fn featured_products(&self) -> Result<Vec<Product>, ShopError> {
        self.store.list_products(&ProductFilter::featured()).await
    }

    /// Any product by id.
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, ShopError> {
        self.store.get_product(id).await
    }

    /// A product the storefront may show. Non-active products are reported
    /// as not found.
    pub async fn active_product(&self, id: &ProductId) -> Result<Product, ShopError> {
        match self.store.get_product(id).await? {
            Some(product) if product.status == ProductStatus::Active => Ok(product),
            _ => Err(ShopError::NotFound {
                entity: "product",
                id: id.to_string(),
            }),
        }
    }
}
