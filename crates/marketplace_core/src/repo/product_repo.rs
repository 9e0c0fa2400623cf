//! Product repository contract and SQLite implementation.
//!
//! # Invariants
//! - `user_id` existence is enforced by the `products.user_id` foreign key,
//!   not checked here.
//! - `list_products_by_user` returns rows in insertion order; callers must
//!   not depend on any ordering.
//! - `user_id` is never rewritten by `update_product`.

use super::{log_operation, log_patch, parse_uuid, EntityKind, RepoError, RepoResult};
use crate::db::ConnectionManager;
use crate::model::product::{NewProduct, Product, ProductId, ProductPatch};
use crate::model::user::UserId;
use log::warn;
use rusqlite::{params, Connection, Row};
use std::time::Instant;

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    product_name,
    price,
    quantity,
    description,
    photo,
    location,
    category,
    product_rank
FROM products";

/// Repository interface for product persistence.
pub trait ProductRepository {
    /// Validates `fields`, assigns a fresh id and persists the product.
    fn create_product(&self, fields: NewProduct) -> RepoResult<Product>;
    /// Loads one product by id.
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    /// Loads every product listed by `user_id`.
    fn list_products_by_user(&self, user_id: UserId) -> RepoResult<Vec<Product>>;
    /// Merges `patch` into the stored product and persists the result.
    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> RepoResult<Product>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'m> {
    manager: &'m ConnectionManager,
}

impl<'m> SqliteProductRepository<'m> {
    pub fn new(manager: &'m ConnectionManager) -> Self {
        Self { manager }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, fields: NewProduct) -> RepoResult<Product> {
        let started_at = Instant::now();
        let product = Product::create(fields).map_err(|err| {
            warn!(
                "event=product_create module=repo status=rejected error_code=validation_failed field={}",
                err.field()
            );
            RepoError::from(err)
        })?;

        let mut session = self.manager.session()?;
        let result = session.write(|tx| insert_product(tx, &product));
        log_operation("product_create", product.id, &result, started_at);
        result.map(|()| product)
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let session = self.manager.session()?;
        session.read(|conn| select_product(conn, id))
    }

    fn list_products_by_user(&self, user_id: UserId) -> RepoResult<Vec<Product>> {
        let session = self.manager.session()?;
        session.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PRODUCT_SELECT_SQL}
                 WHERE user_id = ?1
                 ORDER BY rowid ASC;"
            ))?;
            let mut rows = stmt.query([user_id.to_string()])?;
            let mut products = Vec::new();
            while let Some(row) = rows.next()? {
                products.push(parse_product_row(row)?);
            }
            Ok(products)
        })
    }

    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> RepoResult<Product> {
        let started_at = Instant::now();
        let mut session = self.manager.session()?;
        let result = session.write(|tx| {
            let mut product = select_product(tx, id)?
                .ok_or_else(|| RepoError::not_found(EntityKind::Product, id))?;

            let outcome = product.apply_patch(patch);
            log_patch("product_update", id, &outcome);
            if !outcome.is_noop() {
                write_product(tx, &product)?;
            }
            Ok(product)
        });
        log_operation("product_update", id, &result, started_at);
        result
    }
}

fn insert_product(conn: &Connection, product: &Product) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO products (
            id,
            user_id,
            product_name,
            price,
            quantity,
            description,
            photo,
            location,
            category,
            product_rank
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            product.id.to_string(),
            product.user_id.to_string(),
            product.product_name.as_str(),
            product.price,
            product.quantity,
            product.description.as_str(),
            product.photo.as_str(),
            product.location.as_str(),
            product.category.as_str(),
            product.product_rank,
        ],
    )?;
    Ok(())
}

fn write_product(conn: &Connection, product: &Product) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE products
         SET
            product_name = ?2,
            price = ?3,
            quantity = ?4,
            description = ?5,
            photo = ?6,
            location = ?7,
            category = ?8,
            product_rank = ?9
         WHERE id = ?1;",
        params![
            product.id.to_string(),
            product.product_name.as_str(),
            product.price,
            product.quantity,
            product.description.as_str(),
            product.photo.as_str(),
            product.location.as_str(),
            product.category.as_str(),
            product.product_rank,
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::not_found(EntityKind::Product, product.id));
    }
    Ok(())
}

fn select_product(conn: &Connection, id: ProductId) -> RepoResult<Option<Product>> {
    let mut stmt = conn.prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_product_row(row)?));
    }
    Ok(None)
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "products.id")?;
    let user_id_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_id_text, "products.user_id")?;

    let fields = NewProduct {
        user_id,
        product_name: row.get("product_name")?,
        price: row.get("price")?,
        quantity: row.get("quantity")?,
        description: row.get("description")?,
        photo: row.get("photo")?,
        location: row.get("location")?,
        category: row.get("category")?,
        product_rank: row.get("product_rank")?,
    };

    Product::with_id(id, fields)
        .map_err(|err| RepoError::InvalidData(format!("product {id} fails validation: {err}")))
}
