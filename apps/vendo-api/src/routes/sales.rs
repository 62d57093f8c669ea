//! Sale routes: create, show, delete.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;
use vendo_core::{Cart, Sale};
use vendo_ledger::{SaleTotals, SkippedRestore};

use crate::auth::AuthActor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/{id}", get(get_sale).delete(delete_sale))
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSaleResponse {
    pub success: bool,
    pub message: String,
    pub restored_products: usize,
    pub skipped: Vec<SkippedRestore>,
}

async fn create_sale(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    payload: Result<Json<Cart>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(cart) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let sale = state.processor.create_sale(&actor, cart).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn get_sale(
    State(state): State<Arc<AppState>>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleTotals>> {
    Ok(Json(state.reporter.sale_totals(&id).await?))
}

async fn delete_sale(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteSaleResponse>> {
    let summary = state.reversal.delete_sale(&actor, &id).await?;
    info!(sale_id = %id, admin = %actor.id, "Sale deleted via API");

    let message = if summary.skipped.is_empty() {
        format!("Sale deleted, {} product(s) restored", summary.restored_products)
    } else {
        format!(
            "Sale deleted, {} product(s) restored, {} could not be restored",
            summary.restored_products,
            summary.skipped.len()
        )
    };

    Ok(Json(DeleteSaleResponse {
        success: true,
        message,
        restored_products: summary.restored_products,
        skipped: summary.skipped,
    }))
}
