//! # Vendo API
//!
//! HTTP surface of the sale ledger.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health              none      "OK"                             │
//! │  POST   /sales               bearer    201 + Sale                       │
//! │  GET    /sales/{id}          bearer    sale with unified totals         │
//! │  DELETE /sales/{id}          admin     { success, message,              │
//! │                                          restoredProducts }             │
//! │  GET    /activity-logs       bearer    paginated, filtered log          │
//! │  GET    /reports/revenue     bearer    revenue over ?from&to            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `VENDO_DATABASE_PATH` - SQLite file (default: ./vendo.db)
//! - `VENDO_HTTP_PORT` - listen port (default: 8080)
//! - `VENDO_JWT_SECRET` - secret for bearer tokens
//! - `VENDO_JWT_LIFETIME_SECS` - token lifetime (default: 43200)
//! - `VENDO_EXCHANGE_RATE` - HTG per USD, must be > 0 (default: 132)
//! - `VENDO_DISPLAY_CURRENCY` - HTG or USD (default: HTG)
//! - `VENDO_TAX_RATE_PERCENT` - 0 to 100 (default: 0)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use vendo_db::Database;
use vendo_ledger::{RevenueReporter, SaleProcessor, SaleReversal};

pub use auth::{AuthActor, JwtManager};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub processor: SaleProcessor,
    pub reversal: SaleReversal,
    pub reporter: RevenueReporter,
    pub jwt: JwtManager,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Result<Self, ConfigError> {
        let ledger = config.ledger_config()?;

        Ok(AppState {
            processor: SaleProcessor::new(db.clone(), ledger),
            reversal: SaleReversal::new(db.clone()),
            reporter: RevenueReporter::new(db.clone(), ledger),
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
            db,
        })
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::sales::routes())
        .merge(routes::activity::routes())
        .merge(routes::reports::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
