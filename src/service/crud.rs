//! CRUD for the owning entities of scoped ledgers (cities, car models).

use crate::config::{EntityScope, ResolvedLedger};
use crate::error::{is_foreign_key_violation, AppError};
use crate::store::quote;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Columns owned by the store; never taken from a request body.
const RESERVED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

type EntityRow = (i64, String, DateTime<Utc>, DateTime<Utc>);

pub struct EntityService;

impl EntityService {
    pub async fn list(pool: &SqlitePool, ledger: &ResolvedLedger) -> Result<Vec<Value>, AppError> {
        let scope = entity_scope(ledger)?;
        let sql = format!(
            "SELECT id, attributes, created_at, updated_at FROM {} ORDER BY id",
            quote(&scope.table_name)
        );
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<EntityRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
        Ok(rows.into_iter().map(row_to_json).collect())
    }

    pub async fn read(pool: &SqlitePool, ledger: &ResolvedLedger, id: i64) -> Result<Option<Value>, AppError> {
        let scope = entity_scope(ledger)?;
        let sql = format!(
            "SELECT id, attributes, created_at, updated_at FROM {} WHERE id = ?",
            quote(&scope.table_name)
        );
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<EntityRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
        Ok(row.map(row_to_json))
    }

    pub async fn exists(pool: &SqlitePool, ledger: &ResolvedLedger, id: i64) -> Result<bool, AppError> {
        let scope = entity_scope(ledger)?;
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", quote(&scope.table_name));
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<i64> = sqlx::query_scalar(&sql).bind(id).fetch_optional(pool).await?;
        Ok(row.is_some())
    }

    /// Insert one entity. Reserved fields in the body are ignored. Returns the created row.
    pub async fn create(
        pool: &SqlitePool,
        ledger: &ResolvedLedger,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let scope = entity_scope(ledger)?;
        let attributes = attributes_json(body)?;
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (attributes, created_at, updated_at) VALUES (?, ?, ?)",
            quote(&scope.table_name)
        );
        tracing::debug!(sql = %sql, "query");
        let result = sqlx::query(&sql)
            .bind(&attributes)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(row_to_json((result.last_insert_rowid(), attributes, now, now)))
    }

    /// Replace the attributes of one entity. Returns the updated row, or None if absent.
    pub async fn update(
        pool: &SqlitePool,
        ledger: &ResolvedLedger,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let scope = entity_scope(ledger)?;
        let attributes = attributes_json(body)?;
        let sql = format!(
            "UPDATE {} SET attributes = ?, updated_at = ? WHERE id = ?",
            quote(&scope.table_name)
        );
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql)
            .bind(&attributes)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::read(pool, ledger, id).await
    }

    /// Delete one entity. Refused (Conflict) while it still owns movements.
    /// Callers hold the entity's account guard so no movement lands between the count and the delete.
    pub async fn delete(pool: &SqlitePool, ledger: &ResolvedLedger, id: i64) -> Result<Option<Value>, AppError> {
        let scope = entity_scope(ledger)?;
        let Some(row) = Self::read(pool, ledger, id).await? else {
            return Ok(None);
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE entity_id = ?",
            quote(&ledger.movements_table)
        );
        tracing::debug!(sql = %count_sql, id, "query");
        let movements: i64 = sqlx::query_scalar(&count_sql).bind(id).fetch_one(pool).await?;
        if movements > 0 {
            return Err(AppError::Conflict(format!(
                "entity {} has {} movement(s) and cannot be deleted",
                id, movements
            )));
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", quote(&scope.table_name));
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query(&sql).bind(id).execute(pool).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Conflict(format!("entity {} still has movements and cannot be deleted", id))
            } else {
                AppError::Db(e)
            }
        })?;
        Ok(Some(row))
    }
}

fn entity_scope(ledger: &ResolvedLedger) -> Result<&EntityScope, AppError> {
    ledger
        .entity_scope()
        .ok_or_else(|| AppError::BadRequest(format!("ledger {} has no entities", ledger.path_segment)))
}

fn attributes_json(body: &HashMap<String, Value>) -> Result<String, AppError> {
    let attributes: Map<String, Value> = body
        .iter()
        .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::to_string(&attributes).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Flatten a row into `{id, ...attributes, created_at, updated_at}`.
fn row_to_json((id, attributes, created_at, updated_at): EntityRow) -> Value {
    let mut map = match serde_json::from_str::<Value>(&attributes) {
        Ok(Value::Object(m)) => m,
        _ => {
            tracing::warn!(id, "entity attributes are not a JSON object");
            Map::new()
        }
    };
    map.insert("id".into(), Value::Number(id.into()));
    map.insert("created_at".into(), Value::String(created_at.to_rfc3339()));
    map.insert("updated_at".into(), Value::String(updated_at.to_rfc3339()));
    Value::Object(map)
}
