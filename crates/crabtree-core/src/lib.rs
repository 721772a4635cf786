// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Crabtree storefront.
//!
//! This crate provides the error taxonomy, domain types, and adapter traits
//! used throughout the workspace. Storage, payment, and object-store
//! backends implement the traits defined here; services depend only on them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ShopError;
pub use types::{
    HealthStatus, OrderLine, Price, Product, ProductFilter, ProductId, ProductStatus,
    now_timestamp,
};

pub use traits::{Adapter, CatalogStore, ObjectStore, OrderLedger, PaymentGateway};
