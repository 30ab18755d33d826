//! Create the tables of every configured ledger. Idempotent (IF NOT EXISTS).

use crate::config::{LedgerScope, ResolvedModel};
use crate::error::AppError;
use crate::store::quote;
use sqlx::SqlitePool;

/// Entities table (scoped ledgers only) first, then movements with a restricting FK to it.
pub async fn apply_migrations(pool: &SqlitePool, model: &ResolvedModel) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for ledger in &model.ledgers {
        let movements = quote(&ledger.movements_table);
        let entity_ref = match &ledger.scope {
            LedgerScope::Entity(scope) => {
                let entities = quote(&scope.table_name);
                let ddl = format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        attributes TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )
                    "#,
                    entities
                );
                tracing::debug!(sql = %ddl, "migration");
                sqlx::query(&ddl).execute(&mut *tx).await?;
                format!(" REFERENCES {}(id) ON DELETE RESTRICT", entities)
            }
            LedgerScope::Global => String::new(),
        };

        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_id INTEGER{},
                signed_amount INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            movements, entity_ref
        );
        tracing::debug!(sql = %ddl, "migration");
        sqlx::query(&ddl).execute(&mut *tx).await?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (entity_id, id)",
            quote(&format!("idx_{}_entity", ledger.movements_table)),
            movements
        );
        sqlx::query(&index).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!(ledgers = model.ledgers.len(), "ledger tables ready");
    Ok(())
}
