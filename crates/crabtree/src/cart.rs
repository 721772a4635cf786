// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crabtree cart` command implementation.
//!
//! Drives the cart store against the local snapshot file. Products are
//! resolved from the catalog database when they are added or refreshed.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::Subcommand;
use crabtree_cart::{Cart, CartStore, FileSnapshotStore};
use crabtree_catalog::CatalogService;
use crabtree_config::model::CrabtreeConfig;
use crabtree_core::{ProductId, ShopError};
use crabtree_storage::SqliteStorage;

/// Cart actions.
#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Print the cart.
    Show,
    /// Add a product from the catalog.
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Remove a product's line.
    Remove { product_id: String },
    /// Set a line's quantity; zero or less removes it.
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart.
    Clear,
    /// Re-read every product from the catalog, dropping ones no longer sold.
    Refresh,
    /// Empty the cart once the payment for a checkout session is confirmed.
    Confirm { session_id: String },
}

/// Run one cart action and print the resulting cart.
pub async fn run_cart(config: &CrabtreeConfig, command: CartCommand) -> Result<(), ShopError> {
    let mut store = CartStore::open(FileSnapshotStore::new(&config.cart.snapshot_path));

    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let (catalog, storage) = open_catalog(config).await?;
            let product = catalog.active_product(&ProductId(product_id)).await;
            storage.close().await?;
            let product = product?;
            if let Some(available) = product.available() {
                let wanted = store
                    .cart()
                    .get(&product.id)
                    .map_or(0, |line| i64::from(line.quantity))
                    .saturating_add(quantity);
                if wanted > i64::from(available) {
                    eprintln!(
                        "note: only {available} of {} in stock; checkout will be refused",
                        product.name
                    );
                }
            }
            store.add(product, quantity)?;
        }
        CartCommand::Remove { product_id } => {
            store.remove(ProductId(product_id))?;
        }
        CartCommand::Set {
            product_id,
            quantity,
        } => {
            store.set_quantity(ProductId(product_id), quantity)?;
        }
        CartCommand::Clear => {
            store.clear()?;
        }
        CartCommand::Refresh => {
            let (catalog, storage) = open_catalog(config).await?;
            let products = catalog.active_products(None).await;
            storage.close().await?;
            store.refresh(products?)?;
        }
        CartCommand::Confirm { session_id } => {
            let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
            storage.initialize().await?;
            let cleared = store.confirm_payment(storage.as_ref(), &session_id).await;
            storage.close().await?;
            if !cleared? {
                eprintln!("note: payment for {session_id} is not confirmed yet; cart kept");
            }
        }
    }

    print!("{}", render_cart(store.cart()));
    Ok(())
}

async fn open_catalog(
    config: &CrabtreeConfig,
) -> Result<(CatalogService, Arc<SqliteStorage>), ShopError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    Ok((CatalogService::new(storage.clone()), storage))
}

/// Plain-text rendering of a cart.
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "  {:>3} x {:<30} {:>10}  ({})",
            item.quantity,
            item.product.name,
            item.line_total(),
            item.product.id
        );
    }
    let _ = writeln!(
        out,
        "  {} item(s), total {}",
        cart.item_count(),
        cart.total()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabtree_cart::CartAction;
    use crabtree_core::{Price, Product, ProductStatus};

    fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            description: String::new(),
            price_cents: Price::from_minor(cents),
            image_url: String::new(),
            category: String::new(),
            status: ProductStatus::Active,
            featured: false,
            inventory_count: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn empty_cart_renders_placeholder() {
        assert_eq!(render_cart(&Cart::new()), "cart is empty\n");
    }

    #[test]
    fn render_lists_lines_and_total() {
        let cart = crabtree_cart::reduce(
            Cart::new(),
            CartAction::Add {
                product: product("a", "Apron", 1000),
                quantity: 2,
            },
        );
        let cart = crabtree_cart::reduce(
            cart,
            CartAction::Add {
                product: product("b", "Bowl", 500),
                quantity: 1,
            },
        );
        let text = render_cart(&cart);
        assert!(text.contains("Apron"));
        assert!(text.contains("20.00"));
        assert!(text.contains("3 item(s), total 25.00"));
    }

    #[tokio::test]
    async fn commands_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrabtreeConfig::default();
        config.cart.snapshot_path = dir.path().join("cart.json").display().to_string();
        config.storage.database_path = dir.path().join("shop.db").display().to_string();

        let (_, storage) = open_catalog(&config).await.unwrap();
        crabtree_core::CatalogStore::insert_product(&*storage, &product("mug", "Mug", 1250))
            .await
            .unwrap();
        storage.close().await.unwrap();

        run_cart(
            &config,
            CartCommand::Add {
                product_id: "mug".into(),
                quantity: 2,
            },
        )
        .await
        .unwrap();
        run_cart(
            &config,
            CartCommand::Set {
                product_id: "mug".into(),
                quantity: 3,
            },
        )
        .await
        .unwrap();

        let store = CartStore::open(FileSnapshotStore::new(&config.cart.snapshot_path));
        assert_eq!(store.cart().item_count(), 3);
        assert_eq!(store.cart().total().minor(), 3750);

        let err = run_cart(
            &config,
            CartCommand::Add {
                product_id: "ghost".into(),
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ShopError::NotFound { .. }));
    }

    #[tokio::test]
    async fn confirm_clears_cart_only_for_reconciled_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrabtreeConfig::default();
        config.cart.snapshot_path = dir.path().join("cart.json").display().to_string();
        config.storage.database_path = dir.path().join("shop.db").display().to_string();

        let (_, storage) = open_catalog(&config).await.unwrap();
        crabtree_core::CatalogStore::insert_product(&*storage, &product("mug", "Mug", 1250))
            .await
            .unwrap();
        storage.close().await.unwrap();
        run_cart(
            &config,
            CartCommand::Add {
                product_id: "mug".into(),
                quantity: 1,
            },
        )
        .await
        .unwrap();

        let confirm = || CartCommand::Confirm {
            session_id: "cs_paid".into(),
        };
        run_cart(&config, confirm()).await.unwrap();
        let store = CartStore::open(FileSnapshotStore::new(&config.cart.snapshot_path));
        assert_eq!(store.cart().item_count(), 1);

        let (_, storage) = open_catalog(&config).await.unwrap();
        crabtree_core::OrderLedger::apply_confirmed_checkout(
            &*storage,
            &crabtree_core::types::ConfirmedCheckout {
                session_id: "cs_paid".into(),
                event_id: "evt_paid".into(),
                lines: vec![crabtree_core::OrderLine {
                    id: ProductId::from("mug"),
                    quantity: 1,
                }],
            },
        )
        .await
        .unwrap();
        storage.close().await.unwrap();

        run_cart(&config, confirm()).await.unwrap();
        let store = CartStore::open(FileSnapshotStore::new(&config.cart.snapshot_path));
        assert!(store.cart().is_empty());
    }
}
