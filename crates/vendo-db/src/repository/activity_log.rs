//! # Activity Log Repository
//!
//! Append-only business events plus the filtered, paginated read used by
//! the log viewer.
//!
//! ## Filtering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every filter is optional. Unset filters bind NULL and drop out:        │
//! │                                                                         │
//! │    (?1 IS NULL OR action_type = ?1)                                     │
//! │    (?2 IS NULL OR actor_id    = ?2)                                     │
//! │    (?3 IS NULL OR entity_type = ?3)                                     │
//! │    (?4 IS NULL OR created_at >= ?4)                                     │
//! │    (?5 IS NULL OR created_at <  ?5)                                     │
//! │    (?6 IS NULL OR description LIKE '%' || ?6 || '%' ESCAPE '\')         │
//! │                                                                         │
//! │  ORDER BY created_at DESC  LIMIT per_page  OFFSET (page - 1) * per_page │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vendo_core::validation::{escape_like, validate_search_query, ValidationResult};
use vendo_core::{ActivityLog, NewActivity, ValidationError};

/// Default page size for the log viewer.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size the log viewer may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Highest page number accepted.
pub const MAX_PAGE: i64 = 1_000_000;

const FILTER_CLAUSE: &str = "(?1 IS NULL OR action_type = ?1) \
     AND (?2 IS NULL OR actor_id = ?2) \
     AND (?3 IS NULL OR entity_type = ?3) \
     AND (?4 IS NULL OR created_at >= ?4) \
     AND (?5 IS NULL OR created_at < ?5) \
     AND (?6 IS NULL OR description LIKE '%' || ?6 || '%' ESCAPE '\\')";

// =============================================================================
// Query Types
// =============================================================================

/// Filters accepted by the log viewer. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogFilter {
    pub action_type: Option<String>,
    pub actor_id: Option<String>,
    pub entity_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Free-text match against the description.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ActivityLogFilter {
    /// Checks paging bounds and normalizes the search term.
    pub fn validate(&mut self) -> ValidationResult<()> {
        if let Some(page) = self.page {
            if !(1..=MAX_PAGE).contains(&page) {
                return Err(ValidationError::OutOfRange {
                    field: "page".to_string(),
                    min: 1,
                    max: MAX_PAGE,
                });
            }
        }

        if let Some(per_page) = self.per_page {
            if !(1..=MAX_PER_PAGE).contains(&per_page) {
                return Err(ValidationError::OutOfRange {
                    field: "perPage".to_string(),
                    min: 1,
                    max: MAX_PER_PAGE,
                });
            }
        }

        self.search = match self.search.as_deref() {
            Some(term) => Some(validate_search_query(term)?).filter(|t| !t.is_empty()),
            None => None,
        };

        Ok(())
    }

    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    #[inline]
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }
}

/// One page of activity entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogPage {
    pub entries: Vec<ActivityLog>,
    /// Matching entries across all pages.
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the activity log.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: SqlitePool,
}

impl ActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityLogRepository { pool }
    }

    /// Appends an entry and returns it as stored.
    pub async fn append<'e, E>(&self, executor: E, activity: &NewActivity) -> DbResult<ActivityLog>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(
            action = %activity.action,
            entity_id = ?activity.entity_id,
            actor_id = ?activity.actor_id,
            "Appending activity"
        );

        let log = ActivityLog {
            id: Uuid::new_v4().to_string(),
            action_type: activity.action.to_string(),
            entity_type: activity.entity_type.to_string(),
            entity_id: activity.entity_id.clone(),
            description: activity.description.clone(),
            metadata: serde_json::to_string(&activity.metadata)?,
            actor_id: activity.actor_id.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                id, action_type, entity_type, entity_id,
                description, metadata, actor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&log.id)
        .bind(&log.action_type)
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.description)
        .bind(&log.metadata)
        .bind(&log.actor_id)
        .bind(log.created_at)
        .execute(executor)
        .await?;

        Ok(log)
    }

    /// Runs a filtered, paginated query, newest first.
    ///
    /// The filter is expected to have passed [`ActivityLogFilter::validate`].
    pub async fn query(&self, filter: &ActivityLogFilter) -> DbResult<ActivityLogPage> {
        let page = filter.page();
        let per_page = filter.per_page();
        let offset = page.saturating_sub(1).max(0).saturating_mul(per_page);
        let search = filter.search.as_deref().map(escape_like);

        let count_sql = format!("SELECT COUNT(*) FROM activity_logs WHERE {FILTER_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&filter.action_type)
            .bind(&filter.actor_id)
            .bind(&filter.entity_type)
            .bind(filter.from)
            .bind(filter.to)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "SELECT id, action_type, entity_type, entity_id, description, metadata, actor_id, created_at \
             FROM activity_logs WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, rowid DESC LIMIT ?7 OFFSET ?8"
        );
        let entries = sqlx::query_as::<_, ActivityLog>(&page_sql)
            .bind(&filter.action_type)
            .bind(&filter.actor_id)
            .bind(&filter.entity_type)
            .bind(filter.from)
            .bind(filter.to)
            .bind(&search)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(total, page, returned = entries.len(), "Activity log query");

        Ok(ActivityLogPage {
            entries,
            total,
            page,
            per_page,
        })
    }

    /// All entries about one entity, oldest first.
    pub async fn list_for_entity(&self, entity_type: &str, entity_id: &str) -> DbResult<Vec<ActivityLog>> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            "SELECT id, action_type, entity_type, entity_id, description, metadata, actor_id, created_at \
             FROM activity_logs WHERE entity_type = ?1 AND entity_id = ?2 \
             ORDER BY created_at, rowid",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
