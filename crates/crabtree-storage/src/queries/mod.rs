// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the storefront database.

pub mod ledger;
pub mod products;
