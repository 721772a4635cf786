// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-directory object store for product images.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crabtree_config::model::StorageConfig;
use crabtree_core::{Adapter, HealthStatus, ObjectStore, ShopError};

/// Writes objects under a directory and hands back URLs below a public prefix.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.uploads_dir, config.public_base_url.clone())
    }

    fn storage_err(message: String, source: std::io::Error) -> ShopError {
        ShopError::Storage {
            message,
            source: Some(Box::new(source)),
        }
    }
}

/// Keys are flat file names: no separators, no parent references.
fn validate_key(key: &str) -> Result<(), ShopError> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || key.contains("..");
    if bad {
        return Err(ShopError::Validation(format!("invalid object key: {key:?}")));
    }
    Ok(())
}

#[async_trait]
impl Adapter for LocalObjectStore {
    fn name(&self) -> &str {
        "local-objects"
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Unhealthy(format!("{} is not a directory", self.root.display())),
            Err(_) => HealthStatus::Degraded(format!(
                "{} does not exist yet; it is created on first upload",
                self.root.display()
            )),
        })
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ShopError> {
        validate_key(key)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            Self::storage_err(format!("cannot create {}", self.root.display()), e)
        })?;

        let target = self.root.join(key);
        let staging = self.root.join(format!(".{key}.tmp"));
        let size = bytes.len();
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| Self::storage_err(format!("cannot write {key}"), e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| Self::storage_err(format!("cannot finalize {key}"), e))?;

        debug!(key, size, content_type, "object stored");
        Ok(format!("{}/{key}", self.public_base_url))
    }
}
