// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Crabtree integration tests.
//!
//! Provides a mock payment gateway and a harness that wires the full
//! storefront stack over a temporary SQLite database, so HTTP-level tests
//! run without network access.
//!
//! # Components
//!
//! - [`MockPaymentGateway`] - Records checkout requests, hands out sequential ids
//! - [`TestHarness`] - Temp storage, services, and the axum router

pub mod harness;
pub mod mock_gateway;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_gateway::MockPaymentGateway;
