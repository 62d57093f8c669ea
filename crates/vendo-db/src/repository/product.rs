//! # Product Repository
//!
//! Product lookups and the two stock mutations the ledger performs.
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │     SET stock_barre = stock_barre - 30                                  │
//! │   WHERE id = ? AND stock_barre >= 30      ← check and write, one step   │
//! │  RETURNING stock_barre                                                  │
//! │                                                                         │
//! │  Some(70)  → decremented                                                │
//! │  None      → stock moved since it was read (or product is gone)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The column comes from [`StockField::column`], which only ever yields one
//! of three static names.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendo_core::{Product, StockField, StockSlot};

const PRODUCT_COLUMNS: &str = "id, name, category, quantity, stock_barre, stock_boite, \
     purchase_price_cents, alert_threshold, created_at, updated_at";

/// Repository for product database operations.
///
/// Methods taking an executor run against either the pool or an open
/// transaction (`&mut *tx`).
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn find_by_id<'e, E>(&self, executor: E, id: &str) -> DbResult<Option<Product>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// Gets a product by ID using the pool.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.find_by_id(&self.pool, id).await
    }

    /// Inserts a new product.
    pub async fn insert<'e, E>(&self, executor: E, product: &Product) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %product.id, category = %product.category, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category,
                quantity, stock_barre, stock_boite,
                purchase_price_cents, alert_threshold,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.category.as_str())
        .bind(product.quantity)
        .bind(product.stock_barre)
        .bind(product.stock_boite)
        .bind(product.purchase_price_cents)
        .bind(product.alert_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Hard-deletes a product. Sale items and movements keep their
    /// `product_id` as a dangling reference.
    pub async fn delete<'e, E>(&self, executor: E, id: &str) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Subtracts `quantity` from `field` only if at least that much remains.
    ///
    /// Returns the new counter value, or `None` when no row matched (the
    /// counter dropped below `quantity`, or the product no longer exists).
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        id: &str,
        field: StockField,
        quantity: i64,
    ) -> DbResult<Option<i64>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, field = %field, quantity, "Decrementing stock");

        let column = field.column();
        let sql = format!(
            "UPDATE products \
             SET {column} = COALESCE({column}, 0) - ?2, updated_at = ?3 \
             WHERE id = ?1 AND COALESCE({column}, 0) >= ?2 \
             RETURNING {column}"
        );

        let new_value: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .fetch_optional(executor)
            .await?;

        Ok(new_value)
    }

    /// Adds `quantity` back onto `field`.
    ///
    /// Returns the new counter value, or `None` if the product no longer exists.
    pub async fn increment_stock<'e, E>(
        &self,
        executor: E,
        id: &str,
        field: StockField,
        quantity: i64,
    ) -> DbResult<Option<i64>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, field = %field, quantity, "Incrementing stock");

        let column = field.column();
        let sql = format!(
            "UPDATE products \
             SET {column} = COALESCE({column}, 0) + ?2, updated_at = ?3 \
             WHERE id = ?1 \
             RETURNING {column}"
        );

        let new_value: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .fetch_optional(executor)
            .await?;

        Ok(new_value)
    }

    /// Products whose authoritative counter is at or below their alert
    /// threshold, ordered by name.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products
            .into_iter()
            .filter(|p| StockSlot::of(p).current <= p.alert_threshold)
            .collect())
    }

    /// Counts products (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use vendo_core::{Product, ProductCategory, StockField};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trips_category() {
        let db = setup().await;
        let repo = db.products();

        let tile = Product::new("Carrelage 40x40", ProductCategory::Ceramic).with_boxes(12);
        let other = Product::new("Peinture", ProductCategory::Other("paint".into())).with_quantity(3);
        repo.insert(db.pool(), &tile).await.unwrap();
        repo.insert(db.pool(), &other).await.unwrap();

        let found = repo.get_by_id(&tile.id).await.unwrap().unwrap();
        assert_eq!(found.category, ProductCategory::Ceramic);
        assert_eq!(found.stock_boite, Some(12));
        assert_eq!(found.stock_barre, None);

        let found = repo.get_by_id(&other.id).await.unwrap().unwrap();
        assert_eq!(found.category, ProductCategory::Other("paint".into()));

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let db = setup().await;
        let repo = db.products();
        let rebar = Product::new("Fer 12", ProductCategory::Iron).with_bars(100);
        repo.insert(db.pool(), &rebar).await.unwrap();

        let left = repo
            .decrement_stock(db.pool(), &rebar.id, StockField::StockBarre, 30)
            .await
            .unwrap();
        assert_eq!(left, Some(70));

        let refused = repo
            .decrement_stock(db.pool(), &rebar.id, StockField::StockBarre, 71)
            .await
            .unwrap();
        assert_eq!(refused, None);

        let found = repo.get_by_id(&rebar.id).await.unwrap().unwrap();
        assert_eq!(found.stock_barre, Some(70));
        assert_eq!(found.quantity, 0);
    }

    #[tokio::test]
    async fn test_increment_missing_product_returns_none() {
        let db = setup().await;
        let repo = db.products();

        let restored = repo
            .increment_stock(db.pool(), "gone", StockField::Quantity, 5)
            .await
            .unwrap();
        assert_eq!(restored, None);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let db = setup().await;
        let repo = db.products();
        let nails = Product::new("Clous", ProductCategory::Standard).with_quantity(10);
        repo.insert(db.pool(), &nails).await.unwrap();

        repo.delete(db.pool(), &nails.id).await.unwrap();
        assert!(repo.get_by_id(&nails.id).await.unwrap().is_none());
        assert!(repo.delete(db.pool(), &nails.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_low_stock_uses_resolved_counter() {
        let db = setup().await;
        let repo = db.products();

        // Plenty of units but bars are authoritative and low.
        let rebar = Product::new("Fer 10", ProductCategory::Iron)
            .with_quantity(500)
            .with_bars(4)
            .with_alert_threshold(5);
        let cement = Product::new("Ciment", ProductCategory::Standard)
            .with_quantity(50)
            .with_alert_threshold(5);
        repo.insert(db.pool(), &rebar).await.unwrap();
        repo.insert(db.pool(), &cement).await.unwrap();

        let low = repo.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, rebar.id);
    }
}
