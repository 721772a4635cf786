// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin product mutations: create, update, delete, toggles, image upload.

use std::sync::Arc;

use crabtree_core::types::{ProductChanges, ProductInput, ProductPatch};
use crabtree_core::{
    CatalogStore, ObjectStore, Price, Product, ProductId, ShopError, now_timestamp,
};
use rust_decimal::Decimal;
use tracing::info;

/// Largest accepted product image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image MIME types and the extension each is stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Writes to the product catalog on behalf of an authenticated admin.
#[derive(Clone)]
pub struct AdminProducts {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
}

impl AdminProducts {
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Create a product. Status defaults to active, featured to false.
    pub async fn create(&self, input: ProductInput) -> Result<Product, ShopError> {
        let name = validate_name(&input.name)?;
        let price = match input.price {
            Some(price) => validate_price(price)?,
            None => return Err(ShopError::Validation("price is required".into())),
        };

        let now = now_timestamp();
        let product = Product {
            id: ProductId::generate(),
            name,
            description: input.description.trim().to_string(),
            price_cents: price,
            image_url: input.image_url.trim().to_string(),
            category: input.category.trim().to_string(),
            status: input.status.unwrap_or_default(),
            featured: input.featured,
            inventory_count: input.inventory_count,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.insert_product(&product).await?;
        info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Merge the provided fields into an existing product.
    pub async fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, ShopError> {
        let changes = ProductChanges {
            name: patch.name.as_deref().map(validate_name).transpose()?,
            description: patch.description.map(|d| d.trim().to_string()),
            price: patch.price.map(validate_price).transpose()?,
            image_url: patch.image_url.map(|u| u.trim().to_string()),
            category: patch.category.map(|c| c.trim().to_string()),
            status: patch.status,
            featured: patch.featured,
            inventory_count: patch.inventory_count,
        };

        let updated = self
            .store
            .update_product(id, &changes, &now_timestamp())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(product_id = %id, "product updated");
        Ok(updated)
    }

    /// Delete a product. Deleting an unknown id is not an error.
    pub async fn delete(&self, id: &ProductId) -> Result<(), ShopError> {
        let removed = self.store.delete_product(id).await?;
        info!(product_id = %id, removed, "product delete requested");
        Ok(())
    }

    /// Active becomes inactive; anything else becomes active.
    pub async fn toggle_status(&self, id: &ProductId) -> Result<Product, ShopError> {
        let product = self
            .store
            .toggle_status(id, &now_timestamp())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(product_id = %id, status = %product.status, "product status toggled");
        Ok(product)
    }

    pub async fn toggle_featured(&self, id: &ProductId) -> Result<Product, ShopError> {
        let product = self
            .store
            .toggle_featured(id, &now_timestamp())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(product_id = %id, featured = product.featured, "product featured toggled");
        Ok(product)
    }

    /// Store a product image and return its public URL.
    ///
    /// The stored name is random; `filename` is only used for logging.
    pub async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ShopError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let Some((_, extension)) = IMAGE_TYPES.iter().find(|(m, _)| *m == mime) else {
            return Err(ShopError::Validation(format!(
                "unsupported image type {content_type:?}; use JPEG, PNG, WebP, or GIF"
            )));
        };
        if bytes.is_empty() {
            return Err(ShopError::Validation("image is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ShopError::Validation(format!(
                "image is {} bytes; the limit is 5 MiB",
                bytes.len()
            )));
        }

        let key = format!("{}.{extension}", uuid::Uuid::new_v4());
        let size = bytes.len();
        let url = self.objects.put_object(&key, bytes, &mime).await?;
        info!(filename, key = %key, size, "product image uploaded");
        Ok(url)
    }
}

fn not_found(id: &ProductId) -> ShopError {
    ShopError::NotFound {
        entity: "product",
        id: id.to_string(),
    }
}

fn validate_name(name: &str) -> Result<String, ShopError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShopError::Validation("name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_price(price: Decimal) -> Result<Price, ShopError> {
    let price = Price::from_decimal(price)?;
    if price.minor() <= 0 {
        return Err(ShopError::Validation("price must be greater than zero".into()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::test_support::{ProductSeed, seeded_catalog};
    use crabtree_core::ProductStatus;
    use crabtree_storage::LocalObjectStore;

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: "  Wheel thrown  ".to_string(),
            price: Some(Decimal::from_str(price).unwrap()),
            image_url: String::new(),
            category: "ceramics".to_string(),
            status: None,
            featured: false,
            inventory_count: Some(4),
        }
    }

    async fn admin(
        seeds: &[ProductSeed],
    ) -> (AdminProducts, Arc<dyn CatalogStore>, tempfile::TempDir) {
        let (store, dir) = seeded_catalog(seeds).await;
        let objects = Arc::new(LocalObjectStore::new(
            dir.path().join("uploads"),
            "http://localhost:3000/uploads",
        ));
        (AdminProducts::new(store.clone(), objects), store, dir)
    }

    #[tokio::test]
    async fn create_applies_defaults_and_rounds_price() {
        let (admin, store, _dir) = admin(&[]).await;
        let product = admin.create(input("  Mug ", "19.995")).await.unwrap();

        assert_eq!(product.name, "Mug");
        assert_eq!(product.description, "Wheel thrown");
        assert_eq!(product.price_cents.minor(), 2000);
        assert_eq!(product.status, ProductStatus::Active);
        assert!(!product.featured);
        assert_eq!(product.created_at, product.updated_at);

        let stored = store.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(stored, product);
    }

    #[tokio::test]
    async fn create_requires_name_and_positive_price() {
        let (admin, _store, _dir) = admin(&[]).await;

        let err = admin.create(input("   ", "10")).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = admin.create(input("Mug", "0")).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = admin.create(input("Mug", "-4")).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let mut missing_price = input("Mug", "1");
        missing_price.price = None;
        let err = admin.create(missing_price).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let (admin, _store, _dir) = admin(&[ProductSeed::active("mug")]).await;
        let id = ProductId::from("mug");

        let patch = ProductPatch {
            price: Some(Decimal::from_str("12.5").unwrap()),
            inventory_count: Some(None),
            ..ProductPatch::default()
        };
        let updated = admin.update(&id, patch).await.unwrap();
        assert_eq!(updated.name, "mug");
        assert_eq!(updated.price_cents.minor(), 1250);
        assert_eq!(updated.inventory_count, None);
        assert_ne!(updated.updated_at, updated.created_at);
    }

    #[tokio::test]
    async fn update_rejects_blank_name_and_unknown_id() {
        let (admin, _store, _dir) = admin(&[ProductSeed::active("mug")]).await;

        let patch = ProductPatch {
            name: Some(" ".into()),
            ..ProductPatch::default()
        };
        let err = admin.update(&ProductId::from("mug"), patch).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = admin
            .update(&ProductId::from("ghost"), ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_unconditional() {
        let (admin, store, _dir) = admin(&[ProductSeed::active("mug")]).await;
        let id = ProductId::from("mug");
        admin.delete(&id).await.unwrap();
        admin.delete(&id).await.unwrap();
        assert!(store.get_product(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggles_flip_and_report_missing() {
        let (admin, _store, _dir) = admin(&[ProductSeed::active("mug")]).await;
        let id = ProductId::from("mug");

        assert_eq!(
            admin.toggle_status(&id).await.unwrap().status,
            ProductStatus::Inactive
        );
        assert_eq!(
            admin.toggle_status(&id).await.unwrap().status,
            ProductStatus::Active
        );
        assert!(admin.toggle_featured(&id).await.unwrap().featured);

        let err = admin
            .toggle_featured(&ProductId::from("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::NotFound { .. }));
    }

    #[tokio::test]
    async fn upload_validates_type_and_size() {
        let (admin, _store, dir) = admin(&[]).await;

        let url = admin
            .upload_image("mug.png", "image/png", vec![137, 80, 78, 71])
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/uploads/"));
        assert!(url.ends_with(".png"));
        let name = url.rsplit('/').next().unwrap();
        assert!(dir.path().join("uploads").join(name).exists());

        let err = admin
            .upload_image("notes.txt", "text/plain", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = admin
            .upload_image("huge.jpg", "image/jpeg", vec![0; MAX_IMAGE_BYTES + 1])
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }
}
