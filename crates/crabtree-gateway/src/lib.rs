// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the Crabtree storefront.
//!
//! Public routes serve the catalog, open checkout sessions and receive the
//! payment gateway's notifications. Admin routes sit behind a bearer
//! middleware that fails closed when no admin password is configured.

pub mod admin;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AdminAuth;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, build_router, start_server};
