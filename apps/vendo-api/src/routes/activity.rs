//! Read-only activity log viewer.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use vendo_db::{ActivityLogFilter, ActivityLogPage};

use crate::auth::AuthActor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/activity-logs", get(list_activity))
}

/// `GET /activity-logs?actionType&actorId&entityType&from&to&search&page&perPage`
async fn list_activity(
    State(state): State<Arc<AppState>>,
    AuthActor(_actor): AuthActor,
    query: Result<Query<ActivityLogFilter>, QueryRejection>,
) -> ApiResult<Json<ActivityLogPage>> {
    let Query(mut filter) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    filter.validate()?;

    Ok(Json(state.db.activity().query(&filter).await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use vendo_core::{Product, ProductCategory};

    async fn with_history() -> TestApp {
        let app = TestApp::new().await;
        let tiles = app
            .stock(
                Product::new("Ceramique 40x40", ProductCategory::Ceramic)
                    .with_boxes(6)
                    .with_alert_threshold(5),
            )
            .await;

        let cart = json!({
            "paymentMethod": "card",
            "subtotalCents": 290_000,
            "totalCents": 290_000,
            "items": [{
                "productId": tiles.id,
                "quantity": 2,
                "unitPriceCents": 145_000,
                "subtotalCents": 290_000,
                "currency": "HTG"
            }]
        });
        let (status, _) = app
            .send(Method::POST, "/sales", Some(&app.seller_token()), Some(cart))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        app
    }

    #[tokio::test]
    async fn test_lists_sale_and_alert() {
        let app = with_history().await;
        let (status, body) = app
            .send(Method::GET, "/activity-logs", Some(&app.admin_token()), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);
    }

    #[tokio::test]
    async fn test_filters_by_action_and_actor() {
        let app = with_history().await;
        let token = app.admin_token();

        let (_, body) = app
            .send(Method::GET, "/activity-logs?actionType=stock_alert", Some(&token), None)
            .await;
        assert_eq!(body["total"], 1);
        assert!(body["entries"][0]["actor_id"].is_null());

        let (_, body) = app
            .send(Method::GET, "/activity-logs?actorId=seller-1&perPage=5", Some(&token), None)
            .await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["perPage"], 5);
        assert_eq!(body["entries"][0]["action_type"], "sale_created");
    }

    #[tokio::test]
    async fn test_rejects_bad_paging() {
        let app = with_history().await;
        let (status, body) = app
            .send(Method::GET, "/activity-logs?perPage=1000", Some(&app.admin_token()), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = app
            .send(
                Method::GET,
                "/activity-logs?page=9223372036854775807",
                Some(&app.admin_token()),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
