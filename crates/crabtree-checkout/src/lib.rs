// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkout flow: cart → hosted session → confirmed payment → stock.
//!
//! [`CheckoutBuilder`] validates a cart against live stock and opens a session
//! with the payment gateway. [`ConfirmationHandler`] consumes the gateway's
//! completion notification and reconciles inventory exactly once per session.

pub mod builder;
pub mod confirm;

pub use builder::{CheckoutBuilder, CheckoutItem, CheckoutSession, ProductRef};
pub use confirm::{ConfirmationHandler, ConfirmationOutcome};
