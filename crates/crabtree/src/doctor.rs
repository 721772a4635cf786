// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crabtree doctor` command implementation.
//!
//! Runs diagnostic checks against the storefront environment: secrets that
//! `serve` needs, the catalog database, and the uploads directory.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use crabtree_config::model::CrabtreeConfig;
use crabtree_core::ShopError;
use crabtree_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `crabtree doctor` command.
///
/// Runs quick diagnostic checks. With `--deep`, runs additional intensive checks.
/// With `--plain`, disables colored output. Returns an error if any check failed.
pub async fn run_doctor(config: &CrabtreeConfig, deep: bool, plain: bool) -> Result<(), ShopError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config, deep).await;

    println!();
    println!("  crabtree doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Pass => {}
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(ShopError::Config(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

async fn collect_checks(config: &CrabtreeConfig, deep: bool) -> Vec<CheckResult> {
    let mut results = vec![
        check_payment_secret(config),
        check_webhook_secret(config),
        check_admin_password(config),
        check_database(&config.storage.database_path).await,
        check_uploads_dir(&config.storage.uploads_dir),
    ];

    if deep {
        results.push(check_db_integrity(&config.storage.database_path).await);
        results.push(check_migrations().await);
        results.push(check_memory_baseline());
    }
    results
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// `serve` refuses to start without it.
fn check_payment_secret(config: &CrabtreeConfig) -> CheckResult {
    let start = Instant::now();
    match config.payments.secret_key.as_deref() {
        Some(key) if !key.trim().is_empty() => CheckResult::new(
            "Payment key",
            CheckStatus::Pass,
            format!("set (api {})", config.payments.api_base),
            start,
        ),
        _ => CheckResult::new(
            "Payment key",
            CheckStatus::Fail,
            "payments.secret_key is not set; serve will refuse to start",
            start,
        ),
    }
}

fn check_webhook_secret(config: &CrabtreeConfig) -> CheckResult {
    let start = Instant::now();
    match config.payments.webhook_secret.as_deref() {
        Some(secret) if !secret.trim().is_empty() => CheckResult::new(
            "Webhook secret",
            CheckStatus::Pass,
            format!(
                "set (tolerance {}s)",
                config.payments.signature_tolerance_secs
            ),
            start,
        ),
        _ => CheckResult::new(
            "Webhook secret",
            CheckStatus::Warn,
            "not set; payment notifications will be accepted unsigned",
            start,
        ),
    }
}

fn check_admin_password(config: &CrabtreeConfig) -> CheckResult {
    let start = Instant::now();
    match config.admin.password.as_deref() {
        Some(password) if !password.trim().is_empty() => {
            CheckResult::new("Admin password", CheckStatus::Pass, "set", start)
        }
        _ => CheckResult::new(
            "Admin password",
            CheckStatus::Warn,
            "not set; admin API is locked",
            start,
        ),
    }
}

async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "Database",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };

    let counts = conn
        .call(|conn| -> Result<(i64, i64), rusqlite::Error> {
            let products = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
            let orders =
                conn.query_row("SELECT COUNT(*) FROM processed_checkouts", [], |row| row.get(0))?;
            Ok((products, orders))
        })
        .await;

    match counts {
        Ok((products, orders)) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!("{products} product(s), {orders} reconciled checkout(s)"),
            start,
        ),
        Err(e) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("query failed: {e}"),
            start,
        ),
    }
}

fn check_uploads_dir(uploads_dir: &str) -> CheckResult {
    let start = Instant::now();
    match std::fs::metadata(uploads_dir) {
        Ok(meta) if meta.is_dir() => {
            CheckResult::new("Uploads dir", CheckStatus::Pass, uploads_dir, start)
        }
        Ok(_) => CheckResult::new(
            "Uploads dir",
            CheckStatus::Fail,
            format!("{uploads_dir} is not a directory"),
            start,
        ),
        Err(_) => CheckResult::new(
            "Uploads dir",
            CheckStatus::Warn,
            format!("not found: {uploads_dir} (created on first upload)"),
            start,
        ),
    }
}

/// Deep check: SQLite integrity.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "DB integrity",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "DB integrity",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };

    let rows = conn
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(rows)
        })
        .await;

    match rows {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Deep check: the embedded migrations apply cleanly to a fresh database.
async fn check_migrations() -> CheckResult {
    let start = Instant::now();
    match Database::open_in_memory().await {
        Ok(db) => {
            let _ = db.close().await;
            CheckResult::new("Migrations", CheckStatus::Pass, "apply cleanly", start)
        }
        Err(e) => CheckResult::new("Migrations", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Deep check: memory baseline via jemalloc.
fn check_memory_baseline() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Warn,
            "jemalloc not available on MSVC",
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabtree_storage::SqliteStorage;

    fn config_in(dir: &tempfile::TempDir) -> CrabtreeConfig {
        let mut config = CrabtreeConfig::default();
        config.storage.database_path = dir.path().join("shop.db").display().to_string();
        config.storage.uploads_dir = dir.path().join("uploads").display().to_string();
        config
    }

    fn status_of<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckStatus {
        &results
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no check named {name}"))
            .status
    }

    #[tokio::test]
    async fn fresh_environment_fails_on_missing_payment_key() {
        let dir = tempfile::tempdir().unwrap();
        let results = collect_checks(&config_in(&dir), false).await;
        assert_eq!(status_of(&results, "Payment key"), &CheckStatus::Fail);
        assert_eq!(status_of(&results, "Webhook secret"), &CheckStatus::Warn);
        assert_eq!(status_of(&results, "Admin password"), &CheckStatus::Warn);
        assert_eq!(status_of(&results, "Database"), &CheckStatus::Warn);
        assert_eq!(status_of(&results, "Uploads dir"), &CheckStatus::Warn);
    }

    #[tokio::test]
    async fn configured_environment_passes_deep_checks() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.payments.secret_key = Some("sk_test_doctor".into());
        config.payments.webhook_secret = Some("whsec_doctor".into());
        config.admin.password = Some("pw".into());
        std::fs::create_dir_all(&config.storage.uploads_dir).unwrap();

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await.unwrap();
        storage.close().await.unwrap();

        let results = collect_checks(&config, true).await;
        for result in &results {
            assert_eq!(result.status, CheckStatus::Pass, "{}: {}", result.name, result.message);
        }
        let database = results.iter().find(|r| r.name == "Database").unwrap();
        assert!(database.message.contains("0 product(s)"));
    }

    #[test]
    fn plain_lines_are_tagged() {
        let result = CheckResult::new("Database", CheckStatus::Warn, "missing", Instant::now());
        let line = format_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("missing"));
    }
}
