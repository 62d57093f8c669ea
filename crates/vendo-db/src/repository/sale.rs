//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CREATE (one transaction)                                               │
//! │     insert_sale() → Sale                                                │
//! │     insert_item() → SaleItem   (per cart line)                          │
//! │                                                                         │
//! │  READ                                                                   │
//! │     find_by_id() / items_for_sale() / list_between()                    │
//! │                                                                         │
//! │  REVERSE (one transaction)                                              │
//! │     delete_items() → n rows                                             │
//! │     delete_sale()  → sale row (after movements are detached)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no update path: a sale is immutable once written.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendo_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, seller_id, customer_name, payment_method, subtotal_cents, \
     discount_type, discount_value, discount_amount_cents, total_cents, created_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, product_name, quantity, unit_price_cents, \
     subtotal_cents, currency, purchase_price_at_sale_cents, profit_amount_cents, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn find_by_id<'e, E>(&self, executor: E, id: &str) -> DbResult<Option<Sale>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by ID using the pool.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        self.find_by_id(&self.pool, id).await
    }

    /// Inserts the sale header row.
    pub async fn insert_sale<'e, E>(&self, executor: E, sale: &Sale) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id = %sale.id, seller_id = %sale.seller_id, total = sale.total_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, seller_id, customer_name, payment_method,
                subtotal_cents, discount_type, discount_value, discount_amount_cents,
                total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.seller_id)
        .bind(&sale.customer_name)
        .bind(sale.payment_method)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_type)
        .bind(sale.discount_value)
        .bind(sale.discount_amount_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Inserts one sale item.
    pub async fn insert_item<'e, E>(&self, executor: E, item: &SaleItem) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(
            sale_id = %item.sale_id,
            product_id = %item.product_id,
            quantity = item.quantity,
            "Inserting sale item"
        );

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, product_name,
                quantity, unit_price_cents, subtotal_cents, currency,
                purchase_price_at_sale_cents, profit_amount_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.subtotal_cents)
        .bind(item.currency)
        .bind(item.purchase_price_at_sale_cents)
        .bind(item.profit_amount_cents)
        .bind(item.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn items_for_sale<'e, E>(&self, executor: E, sale_id: &str) -> DbResult<Vec<SaleItem>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, rowid"
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    /// Gets all items belonging to sales created in `[from, to)`.
    pub async fn items_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {cols} FROM sale_items si \
             WHERE si.sale_id IN (SELECT id FROM sales WHERE created_at >= ?1 AND created_at < ?2) \
             ORDER BY si.created_at, si.rowid",
            cols = ITEM_COLUMNS
                .split(", ")
                .map(|c| format!("si.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists sales created in `[from, to)`, newest first.
    pub async fn list_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at DESC"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Deletes all items of a sale. Returns the number of rows removed.
    pub async fn delete_items<'e, E>(&self, executor: E, sale_id: &str) -> DbResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(sale_id = %sale_id, "Deleting sale items");

        let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes the sale row.
    ///
    /// Fails with a foreign key violation while items or movements still
    /// reference the sale.
    pub async fn delete_sale<'e, E>(&self, executor: E, sale_id: &str) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(sale_id = %sale_id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }

        Ok(())
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use vendo_core::{Currency, DiscountType, PaymentMethod};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sale(created_at: DateTime<Utc>) -> Sale {
        Sale {
            id: generate_sale_id(),
            seller_id: "seller-1".to_string(),
            customer_name: Some("Marie".to_string()),
            payment_method: PaymentMethod::MobileMoney,
            subtotal_cents: 100_000,
            discount_type: DiscountType::Fixed,
            discount_value: 5_000,
            discount_amount_cents: 5_000,
            total_cents: 95_000,
            created_at,
        }
    }

    fn item(sale_id: &str, currency: Currency) -> SaleItem {
        SaleItem {
            id: generate_sale_item_id(),
            sale_id: sale_id.to_string(),
            product_id: "p-1".to_string(),
            product_name: "Ciment".to_string(),
            quantity: 2,
            unit_price_cents: 50_000,
            subtotal_cents: 100_000,
            currency,
            purchase_price_at_sale_cents: 40_000,
            profit_amount_cents: 20_000,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_sale_with_items() {
        let db = setup().await;
        let repo = db.sales();
        let s = sale(Utc::now());

        let mut tx = db.begin().await.unwrap();
        repo.insert_sale(&mut *tx, &s).await.unwrap();
        repo.insert_item(&mut *tx, &item(&s.id, Currency::Htg)).await.unwrap();
        repo.insert_item(&mut *tx, &item(&s.id, Currency::Usd)).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.get_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(found.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(found.discount_type, DiscountType::Fixed);
        assert_eq!(found.customer_name.as_deref(), Some("Marie"));

        let items = repo.items_for_sale(db.pool(), &s.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].currency, Currency::Htg);
        assert_eq!(items[1].currency, Currency::Usd);
    }

    #[tokio::test]
    async fn test_item_requires_existing_sale() {
        let db = setup().await;
        let err = db
            .sales()
            .insert_item(db.pool(), &item("no-such-sale", Currency::Htg))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_sale_cannot_be_deleted_before_items() {
        let db = setup().await;
        let repo = db.sales();
        let s = sale(Utc::now());
        repo.insert_sale(db.pool(), &s).await.unwrap();
        repo.insert_item(db.pool(), &item(&s.id, Currency::Htg)).await.unwrap();

        assert!(repo.delete_sale(db.pool(), &s.id).await.is_err());

        assert_eq!(repo.delete_items(db.pool(), &s.id).await.unwrap(), 1);
        repo.delete_sale(db.pool(), &s.id).await.unwrap();
        assert!(repo.get_by_id(&s.id).await.unwrap().is_none());
        assert!(repo.delete_sale(db.pool(), &s.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_and_items_between() {
        let db = setup().await;
        let repo = db.sales();
        let now = Utc::now();
        let recent = sale(now);
        let old = sale(now - Duration::days(40));
        repo.insert_sale(db.pool(), &recent).await.unwrap();
        repo.insert_sale(db.pool(), &old).await.unwrap();
        repo.insert_item(db.pool(), &item(&recent.id, Currency::Htg)).await.unwrap();
        repo.insert_item(db.pool(), &item(&old.id, Currency::Htg)).await.unwrap();

        let from = now - Duration::days(7);
        let to = now + Duration::days(1);
        let sales = repo.list_between(from, to).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, recent.id);

        let items = repo.items_between(from, to).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sale_id, recent.id);
    }
}
