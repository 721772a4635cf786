// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: non-empty
//! paths, well-formed URLs, a plausible currency code, positive timeouts.

use crate::diagnostic::ConfigError;
use crate::model::CrabtreeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &CrabtreeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }

    if !is_http_url(&config.server.public_url) {
        fail(format!(
            "server.public_url `{}` must start with http:// or https://",
            config.server.public_url
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.uploads_dir.trim().is_empty() {
        fail("storage.uploads_dir must not be empty".to_string());
    }

    if !is_http_url(&config.storage.public_base_url) {
        fail(format!(
            "storage.public_base_url `{}` must start with http:// or https://",
            config.storage.public_base_url
        ));
    }

    if !is_http_url(&config.payments.api_base) {
        fail(format!(
            "payments.api_base `{}` must start with http:// or https://",
            config.payments.api_base
        ));
    }

    let currency = &config.payments.currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_lowercase()) {
        fail(format!(
            "payments.currency must be a lowercase three-letter ISO code, got `{currency}`"
        ));
    }

    if config.payments.timeout_secs == 0 {
        fail("payments.timeout_secs must be greater than zero".to_string());
    }

    if config.payments.signature_tolerance_secs == 0 {
        fail("payments.signature_tolerance_secs must be greater than zero".to_string());
    }

    if config
        .payments
        .webhook_secret
        .as_deref()
        .is_some_and(|s| s.trim().is_empty())
    {
        fail("payments.webhook_secret must not be empty when set".to_string());
    }

    if config
        .admin
        .password
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        fail("admin.password must not be empty when set".to_string());
    }

    if config.cart.snapshot_path.trim().is_empty() {
        fail("cart.snapshot_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
