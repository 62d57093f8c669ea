//! Revenue figures. Every amount here goes through the currency normalizer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use vendo_core::{apply_tax, unify, Currency, Money, Sale, SaleItem, UnifiedTotals, ValidationError};
use vendo_db::Database;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};

/// One sale as shown on a receipt or detail screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Item subtotals, before discount and tax.
    pub totals: UnifiedTotals,
    /// Discounted and taxed; matches `sale.total_cents` in the sale's own
    /// display currency.
    pub tax_inclusive_total: Decimal,
    /// Profit in the display currency.
    pub profit: Decimal,
}

/// Revenue over `[from, to)`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub sale_count: usize,
    pub totals: UnifiedTotals,
    pub tax_inclusive_total: Decimal,
    /// Sum of discounts granted, in the display currency.
    pub discount_total: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone)]
pub struct RevenueReporter {
    db: Database,
    config: LedgerConfig,
}

impl RevenueReporter {
    pub fn new(db: Database, config: LedgerConfig) -> Self {
        RevenueReporter { db, config }
    }

    pub async fn sale_totals(&self, sale_id: &str) -> LedgerResult<SaleTotals> {
        let sales = self.db.sales();
        let sale = sales
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| LedgerError::SaleNotFound(sale_id.to_string()))?;
        let items = sales.items_for_sale(self.db.pool(), sale_id).await?;

        let totals = self.unify(&items);
        let net = discounted(totals.unified_total, &sale);
        Ok(SaleTotals {
            tax_inclusive_total: apply_tax(net, self.config.tax_rate),
            profit: self.profit(&items),
            totals,
            sale,
            items,
        })
    }

    pub async fn revenue_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> LedgerResult<RevenueReport> {
        if from >= to {
            return Err(ValidationError::InvalidFormat {
                field: "to".to_string(),
                reason: "must be later than from".to_string(),
            }
            .into());
        }

        let sales = self.db.sales().list_between(from, to).await?;
        let items = self.db.sales().items_between(from, to).await?;
        debug!(sales = sales.len(), items = items.len(), "Revenue query");

        let totals = self.unify(&items);

        let mut by_sale: HashMap<&str, Vec<&SaleItem>> = HashMap::new();
        for item in &items {
            by_sale.entry(item.sale_id.as_str()).or_default().push(item);
        }
        let net_total: Decimal = sales
            .iter()
            .map(|sale| {
                let lines = by_sale.get(sale.id.as_str()).map(Vec::as_slice).unwrap_or_default();
                let unified = unify(lines.iter().copied(), self.config.exchange_rate, self.config.display_currency);
                discounted(unified.unified_total, sale)
            })
            .sum();
        let discount_total = totals.unified_total - net_total;

        Ok(RevenueReport {
            from,
            to,
            sale_count: sales.len(),
            tax_inclusive_total: apply_tax(net_total, self.config.tax_rate),
            discount_total,
            profit: self.profit(&items),
            totals,
        })
    }

    fn unify(&self, items: &[SaleItem]) -> UnifiedTotals {
        unify(items, self.config.exchange_rate, self.config.display_currency)
    }

    /// Profit snapshots carry the currency of their line.
    fn profit(&self, items: &[SaleItem]) -> Decimal {
        let profits: Vec<(Currency, Money)> = items.iter().map(|i| (i.currency, i.profit())).collect();
        unify(&profits, self.config.exchange_rate, self.config.display_currency).unified_total
    }
}

/// `unified` less the sale's discount.
///
/// The discount is stored in the currency the sale was rung up in, next to
/// a subtotal in that same currency, so it is applied as a share of the
/// subtotal and carries over to any display currency.
fn discounted(unified: Decimal, sale: &Sale) -> Decimal {
    if sale.subtotal_cents == 0 || sale.discount_amount_cents == 0 {
        return unified;
    }
    unified * Decimal::from(sale.subtotal_cents - sale.discount_amount_cents) / Decimal::from(sale.subtotal_cents)
}
