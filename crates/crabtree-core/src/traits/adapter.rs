// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every adapter.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::types::HealthStatus;

/// Base trait for all adapters (catalog store, payment gateway, object store).
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Short identifier used in logs and health reports.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's status.
    async fn health_check(&self) -> Result<HealthStatus, ShopError>;
}
