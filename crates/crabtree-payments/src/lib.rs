// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted payment gateway integration.
//!
//! Outbound: [`HttpPaymentGateway`] opens checkout sessions. Inbound:
//! [`SignatureVerifier`] authenticates webhook notifications and
//! [`WebhookEvent`] decodes them.

pub mod client;
pub mod event;
pub mod signature;

pub use client::HttpPaymentGateway;
pub use event::{CART_ITEMS_KEY, CHECKOUT_COMPLETED, ORDER_TYPE_KEY, WebhookEvent};
pub use signature::{SIGNATURE_HEADER, SignatureVerifier, sign_payload};
