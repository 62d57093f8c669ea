//! # Sale Transaction Processor
//!
//! Records a sale and takes its stock out of inventory, all or nothing.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale(actor, cart)                                               │
//! │                                                                         │
//! │  0. cart.validate() + cart.check_totals()      ← no storage access      │
//! │  ── BEGIN ──────────────────────────────────────────────────────────    │
//! │  1. per product: StockSlot::of → check(requested)   ← reads only        │
//! │  2. INSERT sale                                                         │
//! │  3. per line:                                                           │
//! │       re-read product (cost basis, name)                                │
//! │       conditional decrement  ── no row ──►  StockChanged (rollback)     │
//! │       INSERT sale_item (profit snapshot)                                │
//! │       append out-movement (−qty, sale_id)                               │
//! │       new level ≤ threshold ──►  stock_alert                            │
//! │  4. sale_created                                                        │
//! │  ── COMMIT ─────────────────────────────────────────────────────────    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resubmitting the same cart creates a second sale. There is no
//! idempotency key.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info, instrument, warn};
use vendo_core::{
    profit_amount, Actor, Cart, CartLine, Money, MovementType, Sale, SaleItem, StockMovement, StockSlot,
    REASON_SALE,
};
use vendo_db::repository::sale::{generate_sale_id, generate_sale_item_id};
use vendo_db::repository::stock_movement::generate_movement_id;
use vendo_db::{Database, DbError};

use crate::activity::ActivityRecorder;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};

/// Creates sales.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    db: Database,
    config: LedgerConfig,
    recorder: ActivityRecorder,
}

impl SaleProcessor {
    pub fn new(db: Database, config: LedgerConfig) -> Self {
        let recorder = ActivityRecorder::new(db.activity());
        SaleProcessor { db, config, recorder }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Validates the cart, then writes the sale, its items, the stock
    /// decrements and their movements in one transaction.
    ///
    /// The transaction holds the write lock from the availability check on,
    /// so a competing sale of the same stock is seen here as
    /// `InsufficientStock`.
    ///
    /// ## Errors
    /// - `Validation`: malformed cart or totals that do not reconcile
    /// - `ProductNotFound` / `InsufficientStock`: found before any write
    /// - `StockChanged`: a conditional decrement matched no row
    /// - `Database(Busy)`: another writer kept the lock past the busy timeout
    ///   (retryable)
    /// - `Database`: anything else; the transaction is rolled back
    #[instrument(skip_all, fields(seller = %actor.id, lines = cart.items.len()))]
    pub async fn create_sale(&self, actor: &Actor, mut cart: Cart) -> LedgerResult<Sale> {
        cart.validate()?;
        cart.check_totals(
            self.config.exchange_rate,
            self.config.display_currency,
            self.config.tax_rate,
        )?;

        let mut tx = self.db.begin().await?;

        self.check_availability(&mut tx, &cart).await?;

        let sale = Sale {
            id: generate_sale_id(),
            seller_id: actor.id.clone(),
            customer_name: cart.customer_name.clone(),
            payment_method: cart.payment_method,
            subtotal_cents: cart.subtotal_cents,
            discount_type: cart.discount.kind,
            discount_value: cart.discount.value,
            discount_amount_cents: cart.discount.amount_cents,
            total_cents: cart.total_cents,
            created_at: Utc::now(),
        };
        self.db.sales().insert_sale(&mut *tx, &sale).await?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            items.push(self.apply_line(&mut tx, actor, &sale.id, line).await?);
        }

        self.recorder.sale_created(&mut tx, actor, &sale, &items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            items = items.len(),
            total_cents = sale.total_cents,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Read-only pass over every product in the cart. Lines for the same
    /// product are checked against stock together.
    async fn check_availability(&self, conn: &mut SqliteConnection, cart: &Cart) -> LedgerResult<()> {
        let products = self.db.products();

        for (product_id, requested) in cart.requested_by_product() {
            let product = products
                .find_by_id(&mut *conn, product_id)
                .await?
                .ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;

            let slot = StockSlot::of(&product);
            debug!(
                product_id = %product_id,
                field = %slot.field,
                available = slot.current,
                requested,
                "Availability check"
            );
            slot.check(product_id, requested)?;
        }

        Ok(())
    }

    /// Writes one cart line: decrement, item, movement, and a stock alert
    /// when the new level reaches the product's threshold.
    async fn apply_line(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        sale_id: &str,
        line: &CartLine,
    ) -> LedgerResult<SaleItem> {
        let products = self.db.products();

        let product = products
            .find_by_id(&mut *conn, &line.product_id)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(line.product_id.clone()))?;
        let slot = StockSlot::of(&product);

        let Some(new_level) = products
            .decrement_stock(&mut *conn, &product.id, slot.field, line.quantity)
            .await?
        else {
            warn!(
                product_id = %product.id,
                field = %slot.field,
                requested = line.quantity,
                "Stock changed after availability check"
            );
            return Err(LedgerError::StockChanged {
                product_id: product.id,
            });
        };

        let now = Utc::now();
        let product_name = match line.product_name.trim() {
            "" => product.name.clone(),
            name => name.to_string(),
        };
        let item = SaleItem {
            id: generate_sale_item_id(),
            sale_id: sale_id.to_string(),
            product_id: product.id.clone(),
            product_name,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            subtotal_cents: line.subtotal_cents,
            currency: line.currency,
            purchase_price_at_sale_cents: product.purchase_price_cents,
            profit_amount_cents: profit_amount(
                Money::from_cents(line.unit_price_cents),
                product.purchase_price(),
                line.quantity,
            )
            .cents(),
            created_at: now,
        };
        self.db.sales().insert_item(&mut *conn, &item).await?;

        let movement = StockMovement {
            id: generate_movement_id(),
            product_id: product.id.clone(),
            movement_type: MovementType::Out,
            quantity: -line.quantity,
            previous_quantity: new_level + line.quantity,
            new_quantity: new_level,
            stock_field: slot.field.column().to_string(),
            reason: REASON_SALE.to_string(),
            sale_id: Some(sale_id.to_string()),
            created_by: actor.id.clone(),
            created_at: now,
        };
        self.db.movements().append(&mut *conn, &movement).await?;

        if new_level <= product.alert_threshold {
            warn!(
                product_id = %product.id,
                field = %slot.field,
                level = new_level,
                threshold = product.alert_threshold,
                "Stock at or below alert threshold"
            );
            self.recorder
                .stock_alert(&mut *conn, &product, slot.field, new_level)
                .await?;
        }

        Ok(item)
    }
}
