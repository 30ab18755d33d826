//! SQLite pool setup and the movement record store behind every ledger account.

use crate::config::ResolvedLedger;
use crate::error::{is_foreign_key_violation, AppError};
use crate::settings::Settings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open the pool named by `DATABASE_URL`, creating the database file if missing.
/// In-memory databases live on a single connection that is never recycled.
pub async fn open_pool(settings: &Settings) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = if settings.is_memory_database() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await?
    };
    Ok(pool)
}

/// Which account of a ledger a movement belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountScope {
    Global,
    Entity(i64),
}

impl AccountScope {
    pub fn entity_id(&self) -> Option<i64> {
        match self {
            AccountScope::Global => None,
            AccountScope::Entity(id) => Some(*id),
        }
    }
}

/// An immutable, signed, timestamped quantity change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Movement {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    pub signed_amount: i64,
    pub created_at: DateTime<Utc>,
}

type MovementRow = (i64, Option<i64>, i64, DateTime<Utc>);

impl From<MovementRow> for Movement {
    fn from((id, entity_id, signed_amount, created_at): MovementRow) -> Self {
        Movement {
            id,
            entity_id,
            signed_amount,
            created_at,
        }
    }
}

/// Durable append and aggregate queries over a ledger's movements. Never updates or deletes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Sum of signed amounts in the account; 0 when it has no movements.
    async fn sum(&self, scope: AccountScope) -> Result<i64, AppError>;
    async fn append(&self, scope: AccountScope, signed_amount: i64) -> Result<Movement, AppError>;
    /// Movements in insertion order.
    async fn list(&self, scope: AccountScope) -> Result<Vec<Movement>, AppError>;
    async fn count(&self, scope: AccountScope) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool, ledger: &ResolvedLedger) -> Self {
        SqliteRecordStore {
            pool,
            table: quote(&ledger.movements_table),
        }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn sum(&self, scope: AccountScope) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COALESCE(SUM(signed_amount), 0) FROM {} WHERE entity_id IS ?",
            self.table
        );
        tracing::debug!(sql = %sql, scope = ?scope, "query");
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.entity_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn append(&self, scope: AccountScope, signed_amount: i64) -> Result<Movement, AppError> {
        let sql = format!(
            "INSERT INTO {} (entity_id, signed_amount, created_at) VALUES (?, ?, ?)",
            self.table
        );
        tracing::debug!(sql = %sql, scope = ?scope, signed_amount, "query");
        let created_at = Utc::now();
        let result = sqlx::query(&sql)
            .bind(scope.entity_id())
            .bind(signed_amount)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match scope {
                AccountScope::Entity(id) if is_foreign_key_violation(&e) => {
                    AppError::NotFound(format!("entity {}", id))
                }
                _ => AppError::Db(e),
            })?;
        Ok(Movement {
            id: result.last_insert_rowid(),
            entity_id: scope.entity_id(),
            signed_amount,
            created_at,
        })
    }

    async fn list(&self, scope: AccountScope) -> Result<Vec<Movement>, AppError> {
        let sql = format!(
            "SELECT id, entity_id, signed_amount, created_at FROM {} WHERE entity_id IS ? ORDER BY id",
            self.table
        );
        tracing::debug!(sql = %sql, scope = ?scope, "query");
        let rows: Vec<MovementRow> = sqlx::query_as(&sql)
            .bind(scope.entity_id())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Movement::from).collect())
    }

    async fn count(&self, scope: AccountScope) -> Result<u64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE entity_id IS ?", self.table);
        tracing::debug!(sql = %sql, scope = ?scope, "query");
        let n = sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.entity_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }
}

pub(crate) fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
