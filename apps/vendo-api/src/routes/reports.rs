//! Revenue report.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use vendo_ledger::RevenueReport;

use crate::auth::AuthActor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/reports/revenue", get(revenue))
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

async fn revenue(
    State(state): State<Arc<AppState>>,
    AuthActor(_actor): AuthActor,
    query: Result<Query<RevenueQuery>, QueryRejection>,
) -> ApiResult<Json<RevenueReport>> {
    let Query(range) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    Ok(Json(state.reporter.revenue_between(range.from, range.to).await?))
}
