// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shopping cart for the Crabtree storefront.
//!
//! [`reduce`] is a pure function over [`CartAction`]s; [`CartStore`] wraps it
//! with write-through persistence to a [`SnapshotStore`].

pub mod cart;
pub mod snapshot;
pub mod store;

pub use cart::{Cart, CartAction, CartItem, reduce};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use store::CartStore;
