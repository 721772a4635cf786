// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./crabtree.toml` > `~/.config/crabtree/crabtree.toml` > `/etc/crabtree/crabtree.toml`
//! with environment variable overrides via `CRABTREE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CrabtreeConfig;

/// Config sections addressable from environment variables.
const ENV_SECTIONS: &[&str] = &["server", "storage", "payments", "admin", "cart"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/crabtree/crabtree.toml` (system-wide)
/// 3. `~/.config/crabtree/crabtree.toml` (user XDG config)
/// 4. `./crabtree.toml` (local directory)
/// 5. `CRABTREE_*` environment variables
pub fn load_config() -> Result<CrabtreeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CrabtreeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CrabtreeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CrabtreeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CrabtreeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CrabtreeConfig::default()))
        .merge(Toml::file("/etc/crabtree/crabtree.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("crabtree/crabtree.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("crabtree.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CRABTREE_PAYMENTS_WEBHOOK_SECRET` must become
/// `payments.webhook_secret`, not `payments.webhook.secret`.
fn env_provider() -> Env {
    Env::prefixed("CRABTREE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
