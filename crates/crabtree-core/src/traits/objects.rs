// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage trait for product images.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::Adapter;

/// Stores bytes and hands back a durable public URL.
#[async_trait]
pub trait ObjectStore: Adapter {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ShopError>;
}
