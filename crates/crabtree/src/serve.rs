// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crabtree serve` command implementation.
//!
//! Builds every service once, shares them through the router state and
//! serves until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use crabtree_catalog::{AdminProducts, CatalogService};
use crabtree_checkout::{CheckoutBuilder, ConfirmationHandler};
use crabtree_config::model::CrabtreeConfig;
use crabtree_core::{Adapter, PaymentGateway, ShopError};
use crabtree_gateway::{AdminAuth, GatewayState, start_server};
use crabtree_payments::{HttpPaymentGateway, SignatureVerifier};
use crabtree_storage::{LocalObjectStore, SqliteStorage};
use tracing::{info, warn};

use crate::shutdown;

/// Run the storefront server.
pub async fn run_serve(config: CrabtreeConfig) -> Result<(), ShopError> {
    init_tracing(&config.server.log_level);

    // Fail fast: checkout cannot work without the gateway secret.
    let gateway = Arc::new(HttpPaymentGateway::new(&config.payments)?);

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "catalog database ready");

    let state = build_state(&config, storage.clone(), gateway);

    let cancel = shutdown::install_signal_handler();
    let result = start_server(&config.server, state, async move {
        cancel.cancelled().await;
    })
    .await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close database cleanly");
    }
    info!("crabtree serve shutdown complete");
    result
}

/// Wire the services behind the HTTP API.
pub fn build_state<G: PaymentGateway + 'static>(
    config: &CrabtreeConfig,
    storage: Arc<SqliteStorage>,
    gateway: Arc<G>,
) -> GatewayState {
    let objects = Arc::new(LocalObjectStore::from_config(&config.storage));

    let verifier = match config.payments.webhook_secret.as_deref() {
        Some(secret) if !secret.trim().is_empty() => Some(SignatureVerifier::new(
            secret,
            config.payments.signature_tolerance_secs,
        )),
        _ => {
            warn!("payments.webhook_secret is not set; webhook signatures will NOT be verified");
            None
        }
    };

    let admin_auth = AdminAuth::new(config.admin.password.clone());
    if !admin_auth.is_configured() {
        warn!("admin.password is not set; admin API is locked");
    }

    let adapters: Vec<Arc<dyn Adapter>> = vec![
        storage.clone() as Arc<dyn Adapter>,
        objects.clone() as Arc<dyn Adapter>,
        gateway.clone() as Arc<dyn Adapter>,
    ];

    GatewayState {
        catalog: CatalogService::new(storage.clone()),
        admin: AdminProducts::new(storage.clone(), objects),
        checkout: CheckoutBuilder::new(
            storage.clone(),
            gateway,
            config.payments.currency.clone(),
            config.server.public_url.clone(),
        ),
        confirmations: ConfirmationHandler::new(storage, verifier),
        admin_auth,
        adapters: Arc::from(adapters),
        started_at: Instant::now(),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crabtree={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabtree_config::model::StorageConfig;

    #[tokio::test]
    async fn missing_secret_key_fails_before_touching_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrabtreeConfig::default();
        config.storage.database_path = dir.path().join("shop.db").display().to_string();

        let err = run_serve(config).await.unwrap_err();
        assert!(matches!(err, ShopError::Config(_)));
        assert!(!dir.path().join("shop.db").exists());
    }

    #[tokio::test]
    async fn build_state_reports_every_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrabtreeConfig::default();
        config.storage = StorageConfig {
            database_path: dir.path().join("shop.db").display().to_string(),
            uploads_dir: dir.path().join("uploads").display().to_string(),
            ..StorageConfig::default()
        };
        config.payments.secret_key = Some("sk_test_serve".into());
        config.admin.password = Some("pw".into());

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await.unwrap();
        let gateway = Arc::new(HttpPaymentGateway::new(&config.payments).unwrap());

        let state = build_state(&config, storage, gateway);
        let names: Vec<&str> = state.adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["sqlite", "local-objects", "hosted-checkout"]);
        assert!(state.admin_auth.is_configured());
    }
}
