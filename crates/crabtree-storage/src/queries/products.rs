// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product catalog queries.

use std::str::FromStr;

use crabtree_core::types::{ProductChanges, ProductFilter};
use crabtree_core::{Product, ProductId, ProductStatus, ShopError};
use rusqlite::types::{Type, Value};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, image_url, category, status, \
     featured, inventory_count, created_at, updated_at";

fn product_from_row(row: &Row<'_>) -> Result<Product, rusqlite::Error> {
    let status: String = row.get(6)?;
    let status = ProductStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    Ok(Product {
        id: ProductId(row.get(0)?),
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        price_cents: crabtree_core::Price::from_minor(row.get(3)?),
        image_url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        status,
        featured: row.get(7)?,
        inventory_count: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn select_by_id(conn: &rusqlite::Connection, id: &str) -> Result<Option<Product>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
        params![id],
        product_from_row,
    )
    .optional()
}

/// Empty strings are stored as NULL so optional text columns stay uniform.
fn nullable(text: String) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::Text(text)
    }
}

/// List products matching `filter`, newest first.
pub async fn list_products(db: &Database, filter: &ProductFilter) -> Result<Vec<Product>, ShopError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(status) = filter.status {
                clauses.push("status = ?");
                values.push(Value::Text(status.as_str().to_string()));
            }
            if let Some(featured) = filter.featured {
                clauses.push("featured = ?");
                values.push(Value::Integer(i64::from(featured)));
            }
            if let Some(category) = filter.category {
                clauses.push("category = ?");
                values.push(Value::Text(category));
            }

            let where_clause = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };
            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} FROM products {where_clause}
                 ORDER BY created_at DESC, rowid DESC"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), product_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one product by id.
pub async fn get_product(db: &Database, id: &ProductId) -> Result<Option<Product>, ShopError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| select_by_id(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Insert a new product row.
pub async fn insert_product(db: &Database, product: &Product) -> Result<(), ShopError> {
    let product = product.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO products (id, name, description, price_cents, image_url, category,
                                       status, featured, inventory_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    product.id.0,
                    product.name,
                    nullable(product.description),
                    product.price_cents.minor(),
                    nullable(product.image_url),
                    nullable(product.category),
                    product.status.as_str(),
                    product.featured,
                    product.inventory_count,
                    product.created_at,
                    product.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Apply the provided fields and stamp `updated_at`. `None` if the id is absent.
pub async fn update_product(
    db: &Database,
    id: &ProductId,
    changes: &ProductChanges,
    updated_at: &str,
) -> Result<Option<Product>, ShopError> {
    let id = id.0.clone();
    let changes = changes.clone();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(name) = changes.name {
                sets.push("name = ?");
                values.push(Value::Text(name));
            }
            if let Some(description) = changes.description {
                sets.push("description = ?");
                values.push(nullable(description));
            }
            if let Some(price) = changes.price {
                sets.push("price_cents = ?");
                values.push(Value::Integer(price.minor()));
            }
            if let Some(image_url) = changes.image_url {
                sets.push("image_url = ?");
                values.push(nullable(image_url));
            }
            if let Some(category) = changes.category {
                sets.push("category = ?");
                values.push(nullable(category));
            }
            if let Some(status) = changes.status {
                sets.push("status = ?");
                values.push(Value::Text(status.as_str().to_string()));
            }
            if let Some(featured) = changes.featured {
                sets.push("featured = ?");
                values.push(Value::Integer(i64::from(featured)));
            }
            if let Some(inventory) = changes.inventory_count {
                sets.push("inventory_count = ?");
                values.push(inventory.map_or(Value::Null, |n| Value::Integer(i64::from(n))));
            }
            sets.push("updated_at = ?");
            values.push(Value::Text(updated_at));
            values.push(Value::Text(id.clone()));

            let tx = conn.transaction()?;
            let sql = format!("UPDATE products SET {} WHERE id = ?", sets.join(", "));
            let changed = tx.execute(&sql, params_from_iter(values))?;
            if changed == 0 {
                return Ok(None);
            }
            let product = select_by_id(&tx, &id)?;
            tx.commit()?;
            Ok(product)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a product. Returns whether a row was removed.
pub async fn delete_product(db: &Database, id: &ProductId) -> Result<bool, ShopError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Flip `active` to `inactive` and anything else to `active` in one statement.
pub async fn toggle_status(
    db: &Database,
    id: &ProductId,
    updated_at: &str,
) -> Result<Option<Product>, ShopError> {
    toggle(
        db,
        id,
        updated_at,
        "UPDATE products
         SET status = CASE status WHEN 'active' THEN 'inactive' ELSE 'active' END,
             updated_at = ?2
         WHERE id = ?1",
    )
    .await
}

/// Negate the featured flag in one statement.
pub async fn toggle_featured(
    db: &Database,
    id: &ProductId,
    updated_at: &str,
) -> Result<Option<Product>, ShopError> {
    toggle(
        db,
        id,
        updated_at,
        "UPDATE products SET featured = NOT featured, updated_at = ?2 WHERE id = ?1",
    )
    .await
}

async fn toggle(
    db: &Database,
    id: &ProductId,
    updated_at: &str,
    sql: &'static str,
) -> Result<Option<Product>, ShopError> {
    let id = id.0.clone();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            if tx.execute(sql, params![id, updated_at])? == 0 {
                return Ok(None);
            }
            let product = select_by_id(&tx, &id)?;
            tx.commit()?;
            Ok(product)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabtree_core::Price;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_product(id: &str, created_at: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            description: "Hand-thrown".to_string(),
            price_cents: Price::from_minor(1000),
            image_url: String::new(),
            category: "pottery".to_string(),
            status: ProductStatus::Active,
            featured: false,
            inventory_count: Some(5),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let product = make_product("mug", "2026-01-01T00:00:00.000Z");
        insert_product(&db, &product).await.unwrap();

        let fetched = get_product(&db, &product.id).await.unwrap().unwrap();
        assert_eq!(fetched, product);
        assert!(get_product(&db, &ProductId::from("nope")).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_newest_first_with_stable_tiebreak() {
        let (db, _dir) = setup_db().await;
        insert_product(&db, &make_product("a", "2026-01-01T00:00:00.000Z")).await.unwrap();
        insert_product(&db, &make_product("b", "2026-01-02T00:00:00.000Z")).await.unwrap();
        insert_product(&db, &make_product("c", "2026-01-02T00:00:00.000Z")).await.unwrap();

        let ids: Vec<String> = list_products(&db, &ProductFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.0)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn filters_by_status_featured_and_category() {
        let (db, _dir) = setup_db().await;
        let mut draft = make_product("draft", "2026-01-01T00:00:00.000Z");
        draft.status = ProductStatus::Draft;
        let mut featured = make_product("featured", "2026-01-02T00:00:00.000Z");
        featured.featured = true;
        let mut textile = make_product("scarf", "2026-01-03T00:00:00.000Z");
        textile.category = "textiles".to_string();
        for p in [&draft, &featured, &textile] {
            insert_product(&db, p).await.unwrap();
        }

        let active = list_products(&db, &ProductFilter::active()).await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|p| p.status == ProductStatus::Active));

        let featured_only = list_products(&db, &ProductFilter::featured()).await.unwrap();
        assert_eq!(featured_only.len(), 1);
        assert_eq!(featured_only[0].id.0, "featured");

        let textiles = list_products(&db, &ProductFilter::active().with_category("textiles"))
            .await
            .unwrap();
        assert_eq!(textiles.len(), 1);
        assert_eq!(textiles[0].id.0, "scarf");
    }

    #[tokio::test]
    async fn update_merges_fields_and_clears_inventory() {
        let (db, _dir) = setup_db().await;
        let product = make_product("vase", "2026-01-01T00:00:00.000Z");
        insert_product(&db, &product).await.unwrap();

        let changes = ProductChanges {
            name: Some("Tall Vase".to_string()),
            inventory_count: Some(None),
            ..ProductChanges::default()
        };
        let updated = update_product(&db, &product.id, &changes, "2026-02-01T00:00:00.000Z")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Tall Vase");
        assert_eq!(updated.inventory_count, None);
        assert_eq!(updated.price_cents, product.price_cents);
        assert_eq!(updated.updated_at, "2026-02-01T00:00:00.000Z");
        assert_eq!(updated.created_at, product.created_at);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let (db, _dir) = setup_db().await;
        let changes = ProductChanges {
            featured: Some(true),
            ..ProductChanges::default()
        };
        let result = update_product(&db, &ProductId::from("ghost"), &changes, "t")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn toggles_flip_in_place() {
        let (db, _dir) = setup_db().await;
        let mut product = make_product("bowl", "2026-01-01T00:00:00.000Z");
        product.status = ProductStatus::Draft;
        insert_product(&db, &product).await.unwrap();

        let p = toggle_status(&db, &product.id, "t1").await.unwrap().unwrap();
        assert_eq!(p.status, ProductStatus::Active);
        let p = toggle_status(&db, &product.id, "t2").await.unwrap().unwrap();
        assert_eq!(p.status, ProductStatus::Inactive);
        let p = toggle_status(&db, &product.id, "t3").await.unwrap().unwrap();
        assert_eq!(p.status, ProductStatus::Active);

        let p = toggle_featured(&db, &product.id, "t4").await.unwrap().unwrap();
        assert!(p.featured);
        let p = toggle_featured(&db, &product.id, "t5").await.unwrap().unwrap();
        assert!(!p.featured);
        assert_eq!(p.updated_at, "t5");

        assert!(toggle_featured(&db, &ProductId::from("ghost"), "t").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let (db, _dir) = setup_db().await;
        let product = make_product("plate", "2026-01-01T00:00:00.000Z");
        insert_product(&db, &product).await.unwrap();

        assert!(delete_product(&db, &product.id).await.unwrap());
        assert!(!delete_product(&db, &product.id).await.unwrap());
    }
}
