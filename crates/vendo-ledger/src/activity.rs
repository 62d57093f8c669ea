//! # Activity Recorder
//!
//! Builds and appends the business events the ledger emits. Entries are
//! written on the caller's connection so they commit or roll back with the
//! sale they describe.
//!
//! | Event          | Actor         | Entity  | Metadata                               |
//! |----------------|---------------|---------|----------------------------------------|
//! | `sale_created` | seller        | sale    | totals, item count, payment method     |
//! | `sale_deleted` | administrator | sale    | restored count, skipped restorations   |
//! | `stock_alert`  | none (system) | product | counter, new level, threshold          |

use serde_json::json;
use sqlx::SqliteConnection;
use vendo_core::{
    ActivityAction, ActivityLog, Actor, NewActivity, Product, Sale, SaleItem, StockField, ENTITY_PRODUCT,
    ENTITY_SALE,
};
use vendo_db::{ActivityLogRepository, DbResult};

use crate::reversal::RestoreSummary;

/// Writes ledger events to the activity log.
#[derive(Debug, Clone)]
pub struct ActivityRecorder {
    logs: ActivityLogRepository,
}

impl ActivityRecorder {
    pub fn new(logs: ActivityLogRepository) -> Self {
        ActivityRecorder { logs }
    }

    pub async fn sale_created(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        sale: &Sale,
        items: &[SaleItem],
    ) -> DbResult<ActivityLog> {
        self.logs.append(conn, &sale_created(actor, sale, items)).await
    }

    pub async fn sale_deleted(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        sale: &Sale,
        summary: &RestoreSummary,
    ) -> DbResult<ActivityLog> {
        self.logs.append(conn, &sale_deleted(actor, sale, summary)).await
    }

    pub async fn stock_alert(
        &self,
        conn: &mut SqliteConnection,
        product: &Product,
        field: StockField,
        level: i64,
    ) -> DbResult<ActivityLog> {
        self.logs.append(conn, &stock_alert(product, field, level)).await
    }
}

pub fn sale_created(actor: &Actor, sale: &Sale, items: &[SaleItem]) -> NewActivity {
    let units: i64 = items.iter().map(|i| i.quantity).sum();
    NewActivity {
        action: ActivityAction::SaleCreated,
        entity_type: ENTITY_SALE,
        entity_id: Some(sale.id.clone()),
        description: format!(
            "Sale of {} item(s), {} unit(s), total {}",
            items.len(),
            units,
            sale.total()
        ),
        metadata: json!({
            "saleId": sale.id,
            "itemCount": items.len(),
            "units": units,
            "subtotalCents": sale.subtotal_cents,
            "discountAmountCents": sale.discount_amount_cents,
            "totalCents": sale.total_cents,
            "paymentMethod": sale.payment_method,
            "customerName": sale.customer_name,
        }),
        actor_id: Some(actor.id.clone()),
    }
}

pub fn sale_deleted(actor: &Actor, sale: &Sale, summary: &RestoreSummary) -> NewActivity {
    let description = if summary.skipped.is_empty() {
        format!(
            "Sale {} deleted, {} product(s) restored",
            sale.id, summary.restored_products
        )
    } else {
        format!(
            "Sale {} deleted, {} product(s) restored, {} not restored",
            sale.id,
            summary.restored_products,
            summary.skipped.len()
        )
    };

    NewActivity {
        action: ActivityAction::SaleDeleted,
        entity_type: ENTITY_SALE,
        entity_id: Some(sale.id.clone()),
        description,
        metadata: json!({
            "saleId": sale.id,
            "restoredProducts": summary.restored_products,
            "skipped": summary.skipped,
            "totalCents": sale.total_cents,
            "sellerId": sale.seller_id,
        }),
        actor_id: Some(actor.id.clone()),
    }
}

/// System-originated: the actor is left empty.
pub fn stock_alert(product: &Product, field: StockField, level: i64) -> NewActivity {
    NewActivity {
        action: ActivityAction::StockAlert,
        entity_type: ENTITY_PRODUCT,
        entity_id: Some(product.id.clone()),
        description: format!(
            "Low stock: {} has {} {} left (threshold {})",
            product.name,
            level,
            field.label(),
            product.alert_threshold
        ),
        metadata: json!({
            "productId": product.id,
            "stockField": field.column(),
            "level": level,
            "threshold": product.alert_threshold,
        }),
        actor_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reversal::SkippedRestore;
    use chrono::Utc;
    use vendo_core::{DiscountType, PaymentMethod, ProductCategory, Role};

    fn sale() -> Sale {
        Sale {
            id: "s-1".into(),
            seller_id: "seller-1".into(),
            customer_name: None,
            payment_method: PaymentMethod::Cash,
            subtotal_cents: 300_000,
            discount_type: DiscountType::None,
            discount_value: 0,
            discount_amount_cents: 0,
            total_cents: 300_000,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_alert_is_system_originated() {
        let rebar = Product::new("Fer 12", ProductCategory::Iron)
            .with_bars(3)
            .with_alert_threshold(5);
        let entry = stock_alert(&rebar, StockField::StockBarre, 3);

        assert_eq!(entry.action, ActivityAction::StockAlert);
        assert_eq!(entry.actor_id, None);
        assert_eq!(entry.entity_type, "product");
        assert_eq!(entry.description, "Low stock: Fer 12 has 3 bars left (threshold 5)");
        assert_eq!(entry.metadata["stockField"], "stock_barre");
    }

    #[test]
    fn test_sale_deleted_reports_skips() {
        let admin = Actor::new("admin-1", Role::Admin);
        let summary = RestoreSummary {
            sale_id: "s-1".into(),
            restored_products: 1,
            skipped: vec![SkippedRestore {
                product_id: "gone".into(),
                product_name: "Fer 12".into(),
                quantity: 30,
                reason: "product no longer exists".into(),
            }],
        };
        let entry = sale_deleted(&admin, &sale(), &summary);

        assert_eq!(entry.actor_id.as_deref(), Some("admin-1"));
        assert_eq!(entry.metadata["restoredProducts"], 1);
        assert_eq!(entry.metadata["skipped"][0]["productId"], "gone");
        assert!(entry.description.ends_with("1 not restored"));
    }
}
