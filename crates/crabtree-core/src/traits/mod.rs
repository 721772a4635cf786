// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the storefront's external collaborators.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! so services can hold them as `Arc<dyn ...>`.

pub mod adapter;
pub mod catalog;
pub mod ledger;
pub mod objects;
pub mod payment;

pub use adapter::Adapter;
pub use catalog::CatalogStore;
pub use ledger::OrderLedger;
pub use objects::ObjectStore;
pub use payment::PaymentGateway;
