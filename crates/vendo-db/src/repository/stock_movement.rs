//! # Stock Movement Repository
//!
//! The stock ledger. Rows are appended and never deleted; the only update
//! ever issued is [`StockMovementRepository::detach_sale`], which nulls the
//! sale reference when that sale is reversed.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vendo_core::StockMovement;

const MOVEMENT_COLUMNS: &str = "id, product_id, movement_type, quantity, previous_quantity, \
     new_quantity, stock_field, reason, sale_id, created_by, created_at";

/// Repository for the stock movement ledger.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Appends a movement.
    pub async fn append<'e, E>(&self, executor: E, movement: &StockMovement) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(
            product_id = %movement.product_id,
            delta = movement.quantity,
            previous = movement.previous_quantity,
            new = movement.new_quantity,
            "Appending stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, movement_type, quantity,
                previous_quantity, new_quantity, stock_field, reason,
                sale_id, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_quantity)
        .bind(movement.new_quantity)
        .bind(&movement.stock_field)
        .bind(&movement.reason)
        .bind(&movement.sale_id)
        .bind(&movement.created_by)
        .bind(movement.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Full history of one product, oldest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE product_id = ?1 ORDER BY created_at, rowid"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Movements still attached to a sale.
    pub async fn list_for_sale<'e, E>(&self, executor: E, sale_id: &str) -> DbResult<Vec<StockMovement>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE sale_id = ?1 ORDER BY created_at, rowid"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(sale_id)
            .fetch_all(executor)
            .await?;

        Ok(movements)
    }

    /// Nulls the sale reference on every movement pointing at `sale_id`.
    /// Returns the number of rows detached.
    pub async fn detach_sale<'e, E>(&self, executor: E, sale_id: &str) -> DbResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(sale_id = %sale_id, "Detaching movements from sale");

        let result = sqlx::query("UPDATE stock_movements SET sale_id = NULL WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Generates a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use vendo_core::{DiscountType, MovementType, PaymentMethod, Sale};

    async fn setup_with_sale() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = Sale {
            id: "sale-1".to_string(),
            seller_id: "seller-1".to_string(),
            customer_name: None,
            payment_method: PaymentMethod::Cash,
            subtotal_cents: 0,
            discount_type: DiscountType::None,
            discount_value: 0,
            discount_amount_cents: 0,
            total_cents: 0,
            created_at: Utc::now(),
        };
        db.sales().insert_sale(db.pool(), &sale).await.unwrap();
        (db, sale.id)
    }

    fn movement(sale_id: Option<&str>, movement_type: MovementType, delta: i64) -> StockMovement {
        StockMovement {
            id: generate_movement_id(),
            product_id: "p-1".to_string(),
            movement_type,
            quantity: delta,
            previous_quantity: 100,
            new_quantity: 100 + delta,
            stock_field: "stock_barre".to_string(),
            reason: "sale".to_string(),
            sale_id: sale_id.map(str::to_string),
            created_by: "seller-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_detach() {
        let (db, sale_id) = setup_with_sale().await;
        let repo = db.movements();

        repo.append(db.pool(), &movement(Some(&sale_id), MovementType::Out, -30))
            .await
            .unwrap();
        repo.append(db.pool(), &movement(None, MovementType::In, 5))
            .await
            .unwrap();

        let attached = repo.list_for_sale(db.pool(), &sale_id).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].movement_type, MovementType::Out);
        assert_eq!(attached[0].quantity, -30);

        assert_eq!(repo.detach_sale(db.pool(), &sale_id).await.unwrap(), 1);
        assert!(repo.list_for_sale(db.pool(), &sale_id).await.unwrap().is_empty());

        // History survives the detach.
        let history = repo.list_for_product("p-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.sale_id.is_none()));
    }

    #[tokio::test]
    async fn test_attached_movement_blocks_sale_delete() {
        let (db, sale_id) = setup_with_sale().await;
        db.movements()
            .append(db.pool(), &movement(Some(&sale_id), MovementType::Out, -1))
            .await
            .unwrap();

        assert!(db.sales().delete_sale(db.pool(), &sale_id).await.is_err());

        db.movements().detach_sale(db.pool(), &sale_id).await.unwrap();
        db.sales().delete_sale(db.pool(), &sale_id).await.unwrap();
    }
}
