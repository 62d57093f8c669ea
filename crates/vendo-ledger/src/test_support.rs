//! Fixtures shared by the ledger tests.

use rust_decimal_macros::dec;
use vendo_core::currency::to_cents;
use vendo_core::{apply_tax, unify, Actor, Cart, CartLine, Currency, Discount, Money, PaymentMethod, Product, Role};
use vendo_core::{ExchangeRate, TaxRate};
use vendo_db::{Database, DbConfig};

use crate::config::LedgerConfig;

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// HTG display, 132 HTG per USD, no tax.
pub fn config() -> LedgerConfig {
    LedgerConfig::new(
        ExchangeRate::new(dec!(132)).unwrap(),
        Currency::Htg,
        TaxRate::zero(),
    )
}

pub fn seller() -> Actor {
    Actor::new("seller-1", Role::Seller)
}

pub fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub async fn stock(db: &Database, product: Product) -> Product {
    db.products().insert(db.pool(), &product).await.unwrap();
    product
}

pub async fn reload(db: &Database, product: &Product) -> Product {
    db.products().get_by_id(&product.id).await.unwrap().unwrap()
}

pub fn line(product: &Product, quantity: i64, unit_price_cents: i64, currency: Currency) -> CartLine {
    CartLine {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity,
        unit_price_cents,
        subtotal_cents: unit_price_cents * quantity,
        currency,
    }
}

/// Cash cart without discount whose totals reconcile under `config`.
pub fn cart(config: &LedgerConfig, items: Vec<CartLine>) -> Cart {
    let unified = unify(&items, config.exchange_rate, config.display_currency);
    let subtotal_cents = to_cents(unified.unified_total);
    let total_cents = to_cents(apply_tax(Money::from_cents(subtotal_cents).to_decimal(), config.tax_rate));

    Cart {
        customer_name: None,
        payment_method: PaymentMethod::Cash,
        discount: Discount::default(),
        subtotal_cents,
        total_cents,
        items,
    }
}

pub async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}
