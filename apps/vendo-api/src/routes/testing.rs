//! Router test fixtures.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use vendo_core::{Actor, Product, Role};
use vendo_db::{Database, DbConfig};

use crate::{build_router, ApiConfig, AppState};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    /// In-memory database, default pricing (132 HTG/USD, display HTG, no tax).
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        let state = Arc::new(AppState::new(db, &config).unwrap());
        let router = build_router(state.clone());
        TestApp { state, router }
    }

    pub async fn stock(&self, product: Product) -> Product {
        self.state
            .db
            .products()
            .insert(self.state.db.pool(), &product)
            .await
            .unwrap();
        product
    }

    pub fn token(&self, id: &str, role: Role) -> String {
        self.state.jwt.issue_token(&Actor::new(id, role)).unwrap()
    }

    pub fn seller_token(&self) -> String {
        self.token("seller-1", Role::Seller)
    }

    pub fn admin_token(&self) -> String {
        self.token("admin-1", Role::Admin)
    }

    /// Sends one request and returns the status and the JSON body
    /// (`Value::Null` when the body is not JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
