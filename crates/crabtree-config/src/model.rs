// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Crabtree storefront.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Crabtree configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrabtreeConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Catalog database and image storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Hosted payment gateway settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Admin API settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Local cart snapshot settings (used by the `cart` subcommand).
    #[serde(default)]
    pub cart: CartConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public origin of the storefront, used to build checkout redirect URLs.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Directory uploaded product images are written to.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Public URL prefix under which `uploads_dir` is served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            uploads_dir: default_uploads_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_data_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .map(|p| p.join("crabtree"))
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}

fn default_database_path() -> String {
    default_data_dir()
        .join("crabtree.db")
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_uploads_dir() -> String {
    default_data_dir()
        .join("uploads")
        .to_string_lossy()
        .into_owned()
}

fn default_public_base_url() -> String {
    "http://localhost:3000/uploads".to_string()
}

/// Hosted payment gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Base URL of the gateway API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Secret API key. Required by `serve`.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Shared secret for webhook signatures. `None` disables verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// ISO 4217 currency code, lowercase.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Timeout for gateway HTTP calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted age of a webhook signature timestamp, in seconds.
    #[serde(default = "default_signature_tolerance_secs")]
    pub signature_tolerance_secs: u64,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[redacted]"))
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("currency", &self.currency)
            .field("timeout_secs", &self.timeout_secs)
            .field("signature_tolerance_secs", &self.signature_tolerance_secs)
            .finish()
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            secret_key: None,
            webhook_secret: None,
            currency: default_currency(),
            timeout_secs: default_timeout_secs(),
            signature_tolerance_secs: default_signature_tolerance_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.payments.example.com/v1".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_signature_tolerance_secs() -> u64 {
    300
}

/// Admin API configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Shared admin password. `None` locks every admin endpoint.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Local cart snapshot configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CartConfig {
    /// Path of the JSON cart snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    default_data_dir()
        .join("cart.json")
        .to_string_lossy()
        .into_owned()
}
