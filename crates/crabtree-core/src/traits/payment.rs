// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment gateway trait for hosted checkout sessions.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::Adapter;
use crate::types::{CheckoutSessionCreated, CheckoutSessionRequest};

/// A hosted payment provider.
///
/// The provider hosts the payment form; this system only opens sessions and
/// later receives signed completion notifications.
#[async_trait]
pub trait PaymentGateway: Adapter {
    /// Opens a hosted checkout session. Failures surface as `ShopError::Gateway`.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionCreated, ShopError>;
}
