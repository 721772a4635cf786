// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the catalog and ledger traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crabtree_config::model::StorageConfig;
use crabtree_core::types::{ConfirmedCheckout, ProductChanges, ReconcileOutcome};
use crabtree_core::{
    Adapter, CatalogStore, HealthStatus, OrderLedger, Product, ProductFilter, ProductId, ShopError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed catalog and checkout ledger.
///
/// The database is opened lazily by [`SqliteStorage::initialize`]; every
/// other call fails with a data-access error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), ShopError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ShopError::Internal("storage already initialized".into()))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ShopError> {
        let Some(db) = self.db.get() else {
            return Ok(());
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn db(&self) -> Result<&Database, ShopError> {
        self.db.get().ok_or_else(|| {
            ShopError::data_access("storage not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl Adapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("database not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[async_trait]
impl CatalogStore for SqliteStorage {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ShopError> {
        queries::products::list_products(self.db()?, filter).await
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, ShopError> {
        queries::products::get_product(self.db()?, id).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), ShopError> {
        queries::products::insert_product(self.db()?, product).await
    }

    async fn update_product(
        &self,
        id: &ProductId,
        changes: &ProductChanges,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError> {
        queries::products::update_product(self.db()?, id, changes, updated_at).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, ShopError> {
        queries::products::delete_product(self.db()?, id).await
    }

    async fn toggle_status(
        &self,
        id: &ProductId,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError> {
        queries::products::toggle_status(self.db()?, id, updated_at).await
    }

    async fn toggle_featured(
        &self,
        id: &ProductId,
        updated_at: &str,
    ) -> Result<Option<Product>, ShopError> {
        queries::products::toggle_featured(self.db()?, id, updated_at).await
    }
}

#[async_trait]
impl OrderLedger for SqliteStorage {
    async fn apply_confirmed_checkout(
        &self,
        checkout: &ConfirmedCheckout,
    ) -> Result<ReconcileOutcome, ShopError> {
        queries::ledger::apply_confirmed_checkout(self.db()?, checkout).await
    }

    async fn is_processed(&self, session_id: &str) -> Result<bool, ShopError> {
        queries::ledger::is_processed(self.db()?, session_id).await
    }
}
