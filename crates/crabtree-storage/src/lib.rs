// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for the Crabtree storefront.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer model via
//! `tokio-rusqlite`, holding the product catalog and the processed-checkout
//! ledger. Product images go to a local directory served under a public URL.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod objects;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use objects::LocalObjectStore;
