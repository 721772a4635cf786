// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product catalog access and admin mutations.

pub mod admin;
pub mod service;

pub use admin::{AdminProducts, MAX_IMAGE_BYTES};
pub use service::CatalogService;
