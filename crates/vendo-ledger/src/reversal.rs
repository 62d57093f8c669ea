//! # Sale Reversal Processor
//!
//! Deletes a sale and puts its stock back.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_sale(admin, sale_id)                                            │
//! │                                                                         │
//! │  ── BEGIN ──────────────────────────────────────────────────────────    │
//! │  1. load sale + items              (no items: logged, continues)        │
//! │  2. per item, in a SAVEPOINT:                                           │
//! │       counter the sale decremented → increment → in-movement (+qty)     │
//! │       product gone / write fails → ROLLBACK TO SAVEPOINT, skip          │
//! │  3. DELETE sale_items                 ┐                                 │
//! │  4. detach out-movements from sale    ├─ failure → ReversalFailed       │
//! │  5. DELETE sale                       │   (whole reversal rolled back)  │
//! │  6. sale_deleted                      ┘                                 │
//! │  ── COMMIT ─────────────────────────────────────────────────────────    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Skipped restorations do not fail the reversal. They are reported in
//! [`RestoreSummary::skipped`] and in the `sale_deleted` metadata.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::{Connection, SqliteConnection};
use tracing::{info, instrument, warn};
use vendo_core::{
    Actor, MovementType, SaleItem, StockField, StockMovement, StockSlot, REASON_RESTORATION,
};
use vendo_db::repository::stock_movement::generate_movement_id;
use vendo_db::{Database, DbResult};

use crate::activity::ActivityRecorder;
use crate::error::{LedgerError, LedgerResult};

/// Outcome of a reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub sale_id: String,
    /// Items whose stock was put back.
    pub restored_products: usize,
    pub skipped: Vec<SkippedRestore>,
}

/// An item whose stock could not be restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRestore {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub reason: String,
}

enum Restore {
    Restored,
    ProductMissing,
}

/// Deletes sales on behalf of an administrator.
#[derive(Debug, Clone)]
pub struct SaleReversal {
    db: Database,
    recorder: ActivityRecorder,
}

impl SaleReversal {
    pub fn new(db: Database) -> Self {
        let recorder = ActivityRecorder::new(db.activity());
        SaleReversal { db, recorder }
    }

    /// Restores the stock of every item, then removes the sale.
    ///
    /// ## Errors
    /// - `PermissionDenied`: the actor is not an administrator
    /// - `SaleNotFound`: no such sale
    /// - `ReversalFailed`: removing items, detaching movements, removing the
    ///   sale or logging the deletion failed; nothing was changed
    #[instrument(skip_all, fields(admin = %actor.id, sale_id = %sale_id))]
    pub async fn delete_sale(&self, actor: &Actor, sale_id: &str) -> LedgerResult<RestoreSummary> {
        if !actor.is_admin() {
            warn!("Non-admin attempted to delete a sale");
            return Err(LedgerError::PermissionDenied(
                "only administrators can delete sales".to_string(),
            ));
        }

        let sales = self.db.sales();
        let mut tx = self.db.begin().await?;

        let sale = sales
            .find_by_id(&mut *tx, sale_id)
            .await?
            .ok_or_else(|| LedgerError::SaleNotFound(sale_id.to_string()))?;

        let items = sales.items_for_sale(&mut *tx, sale_id).await?;
        if items.is_empty() {
            warn!("Sale has no items, nothing to restore");
        }

        // Counters the sale actually decremented, keyed by product.
        let sold_from: HashMap<String, StockField> = self
            .db
            .movements()
            .list_for_sale(&mut *tx, sale_id)
            .await?
            .into_iter()
            .filter(|m| m.movement_type == MovementType::Out)
            .filter_map(|m| Some((m.product_id, m.stock_field.parse().ok()?)))
            .collect();

        let mut summary = RestoreSummary {
            sale_id: sale_id.to_string(),
            restored_products: 0,
            skipped: Vec::new(),
        };

        for item in &items {
            let field = sold_from.get(&item.product_id).copied();
            let reason = match self.restore_item(&mut tx, actor, item, field).await {
                Ok(Restore::Restored) => {
                    summary.restored_products += 1;
                    continue;
                }
                Ok(Restore::ProductMissing) => "product no longer exists".to_string(),
                Err(e) => e.to_string(),
            };

            warn!(
                product_id = %item.product_id,
                quantity = item.quantity,
                reason = %reason,
                "PartialStockRestoreFailure: skipping item"
            );
            summary.skipped.push(SkippedRestore {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                reason,
            });
        }

        sales
            .delete_items(&mut *tx, sale_id)
            .await
            .map_err(|e| LedgerError::reversal_failed("deleting sale items", e))?;
        self.db
            .movements()
            .detach_sale(&mut *tx, sale_id)
            .await
            .map_err(|e| LedgerError::reversal_failed("detaching stock movements", e))?;
        sales
            .delete_sale(&mut *tx, sale_id)
            .await
            .map_err(|e| LedgerError::reversal_failed("deleting sale", e))?;
        self.recorder
            .sale_deleted(&mut tx, actor, &sale, &summary)
            .await
            .map_err(|e| LedgerError::reversal_failed("recording deletion", e))?;

        tx.commit()
            .await
            .map_err(|e| LedgerError::reversal_failed("commit", e))?;

        info!(
            restored = summary.restored_products,
            skipped = summary.skipped.len(),
            "Sale deleted"
        );

        Ok(summary)
    }

    /// Puts one item's quantity back on `field`, or on the resolved counter
    /// when the sale left no movement for the product.
    ///
    /// Runs in its own savepoint so a failure leaves no half-written
    /// restoration behind.
    async fn restore_item(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        item: &SaleItem,
        field: Option<StockField>,
    ) -> DbResult<Restore> {
        let products = self.db.products();
        let mut savepoint = conn.begin().await?;

        let Some(product) = products.find_by_id(&mut *savepoint, &item.product_id).await? else {
            return Ok(Restore::ProductMissing);
        };
        let slot = match field {
            Some(field) => StockSlot::on(&product, field),
            None => StockSlot::of(&product),
        };

        let Some(new_level) = products
            .increment_stock(&mut *savepoint, &product.id, slot.field, item.quantity)
            .await?
        else {
            return Ok(Restore::ProductMissing);
        };

        let movement = StockMovement {
            id: generate_movement_id(),
            product_id: product.id.clone(),
            movement_type: MovementType::In,
            quantity: item.quantity,
            previous_quantity: new_level - item.quantity,
            new_quantity: new_level,
            stock_field: slot.field.column().to_string(),
            reason: REASON_RESTORATION.to_string(),
            sale_id: None,
            created_by: actor.id.clone(),
            created_at: Utc::now(),
        };
        self.db.movements().append(&mut *savepoint, &movement).await?;

        savepoint.commit().await?;
        Ok(Restore::Restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::SaleProcessor;
    use crate::test_support::*;
    use vendo_core::{Currency, Product, ProductCategory, Sale};

    async fn sell(db: &Database, lines: Vec<vendo_core::CartLine>) -> Sale {
        SaleProcessor::new(db.clone(), config())
            .create_sale(&seller(), cart(&config(), lines))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_restores_bars_and_appends_in_movement() {
        let db = memory_db().await;
        let rebar = stock(&db, Product::new("Fer 1/2", ProductCategory::Iron).with_bars(100)).await;
        let sale = sell(&db, vec![line(&rebar, 30, 60_000, Currency::Htg)]).await;
        assert_eq!(reload(&db, &rebar).await.stock_barre, Some(70));

        let summary = SaleReversal::new(db.clone())
            .delete_sale(&admin(), &sale.id)
            .await
            .unwrap();

        assert_eq!(summary.restored_products, 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(reload(&db, &rebar).await.stock_barre, Some(100));

        let movements = db.movements().list_for_product(&rebar.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].quantity, -30);
        assert_eq!(movements[0].sale_id, None);

        let restore = &movements[1];
        assert_eq!(restore.movement_type, MovementType::In);
        assert_eq!(restore.quantity, 30);
        assert_eq!(restore.previous_quantity, 70);
        assert_eq!(restore.new_quantity, 100);
        assert_eq!(restore.reason, "restoration");
        assert_eq!(restore.sale_id, None);
        assert_eq!(restore.created_by, "admin-1");

        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        assert_eq!(count(&db, "sale_items").await, 0);
    }

    #[tokio::test]
    async fn test_round_trip_restores_every_counter() {
        let db = memory_db().await;
        let cement = stock(&db, Product::new("Ciment", ProductCategory::Standard).with_quantity(50)).await;
        let rebar = stock(&db, Product::new("Fer 3/8", ProductCategory::Iron).with_bars(40)).await;
        let tiles = stock(&db, Product::new("Ceramique 30x30", ProductCategory::Ceramic).with_boxes(20)).await;
        let legacy = stock(&db, Product::new("Fer 1/4", ProductCategory::Standard).with_bars(9)).await;

        let sale = sell(
            &db,
            vec![
                line(&cement, 5, 85_000, Currency::Htg),
                line(&rebar, 4, 500, Currency::Usd),
                line(&tiles, 3, 110_000, Currency::Htg),
                line(&legacy, 9, 20_000, Currency::Htg),
                line(&cement, 2, 85_000, Currency::Htg),
            ],
        )
        .await;

        let summary = SaleReversal::new(db.clone())
            .delete_sale(&admin(), &sale.id)
            .await
            .unwrap();
        assert_eq!(summary.restored_products, 5);

        for before in [&cement, &rebar, &tiles, &legacy] {
            let after = reload(&db, before).await;
            assert_eq!(after.quantity, before.quantity);
            assert_eq!(after.stock_barre, before.stock_barre);
            assert_eq!(after.stock_boite, before.stock_boite);
        }

        // Sold down to zero bars, the legacy product would now resolve to
        // `quantity`; the bars go back where they came from.
        let legacy_after = reload(&db, &legacy).await;
        assert_eq!(legacy_after.stock_barre, Some(9));
        assert_eq!(legacy_after.quantity, 0);
    }

    #[tokio::test]
    async fn test_deleted_product_is_skipped() {
        let db = memory_db().await;
        let cement = stock(&db, Product::new("Ciment", ProductCategory::Standard).with_quantity(50)).await;
        let paint = stock(&db, Product::new("Peinture", ProductCategory::Standard).with_quantity(10)).await;
        let sale = sell(
            &db,
            vec![
                line(&cement, 5, 85_000, Currency::Htg),
                line(&paint, 2, 1_200, Currency::Usd),
            ],
        )
        .await;

        db.products().delete(db.pool(), &paint.id).await.unwrap();

        let summary = SaleReversal::new(db.clone())
            .delete_sale(&admin(), &sale.id)
            .await
            .unwrap();

        assert_eq!(summary.restored_products, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].product_id, paint.id);
        assert_eq!(summary.skipped[0].quantity, 2);
        assert_eq!(reload(&db, &cement).await.quantity, 50);
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());

        // Only the original out-movement exists for the deleted product.
        let movements = db.movements().list_for_product(&paint.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Out);

        let logs = db.activity().list_for_entity("sale", &sale.id).await.unwrap();
        let deleted = logs.iter().find(|l| l.action_type == "sale_deleted").unwrap();
        let metadata = deleted.metadata_json();
        assert_eq!(metadata["restoredProducts"], 1);
        assert_eq!(metadata["skipped"][0]["productId"], paint.id.as_str());
    }

    #[tokio::test]
    async fn test_seller_cannot_delete() {
        let db = memory_db().await;
        let cement = stock(&db, Product::new("Ciment", ProductCategory::Standard).with_quantity(50)).await;
        let sale = sell(&db, vec![line(&cement, 5, 85_000, Currency::Htg)]).await;

        let err = SaleReversal::new(db.clone())
            .delete_sale(&seller(), &sale.id)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_some());
        assert_eq!(reload(&db, &cement).await.quantity, 45);
    }

    #[tokio::test]
    async fn test_unknown_sale() {
        let db = memory_db().await;
        let err = SaleReversal::new(db)
            .delete_sale(&admin(), "no-such-sale")
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::SaleNotFound(id) if id == "no-such-sale"));
    }

    #[tokio::test]
    async fn test_sale_without_items_is_still_deleted() {
        let db = memory_db().await;
        let cement = stock(&db, Product::new("Ciment", ProductCategory::Standard).with_quantity(50)).await;
        let sale = sell(&db, vec![line(&cement, 5, 85_000, Currency::Htg)]).await;
        db.sales().delete_items(db.pool(), &sale.id).await.unwrap();

        let summary = SaleReversal::new(db.clone())
            .delete_sale(&admin(), &sale.id)
            .await
            .unwrap();

        assert_eq!(summary.restored_products, 0);
        assert!(summary.skipped.is_empty());
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        assert_eq!(reload(&db, &cement).await.quantity, 45);
    }

    #[tokio::test]
    async fn test_failed_delete_rolls_back_restoration() {
        let db = memory_db().await;
        let rebar = stock(&db, Product::new("Fer 1/2", ProductCategory::Iron).with_bars(100)).await;
        let sale = sell(&db, vec![line(&rebar, 30, 60_000, Currency::Htg)]).await;

        sqlx::query(
            "CREATE TRIGGER freeze_sales BEFORE DELETE ON sales \
             BEGIN SELECT RAISE(ABORT, 'sales are frozen'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = SaleReversal::new(db.clone())
            .delete_sale(&admin(), &sale.id)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "REVERSAL_FAILED");
        assert!(err.to_string().contains("deleting sale"));

        assert_eq!(reload(&db, &rebar).await.stock_barre, Some(70));
        assert_eq!(db.movements().list_for_product(&rebar.id).await.unwrap().len(), 1);
        assert_eq!(count(&db, "sale_items").await, 1);
        assert_eq!(
            db.movements()
                .list_for_sale(db.pool(), &sale.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
