//! Audit writer
//!
//! Appends immutable records of what happened to bookings, cabins, and holds.
//! New module: grounded on the teacher's general append-only-ledger pattern
//! used for points transactions (`services/loyalty.rs`'s `award_points`,
//! which inserts a `PointsTransaction` row alongside the balance update
//! rather than mutating history), adapted to the `audit_entries` table shape
//! described by `models::audit`.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::audit::{AuditAction, AuditEntry, AuditEntryRow, AuditListFilter};

pub struct AuditService<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        table_name: &str,
        record_id: &str,
        action: AuditAction,
        old_values: Option<Value>,
        new_values: Option<Value>,
        user_id: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (table_name, record_id, action, old_values, new_values, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .bind(action)
        .bind(old_values)
        .bind(new_values)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn record_insert(&self, table_name: &str, record_id: &str, new_values: Value) -> AppResult<()> {
        self.record(table_name, record_id, AuditAction::Insert, None, Some(new_values), None)
            .await
    }

    pub async fn record_update(
        &self,
        table_name: &str,
        record_id: &str,
        old_values: Value,
        new_values: Value,
    ) -> AppResult<()> {
        self.record(
            table_name,
            record_id,
            AuditAction::Update,
            Some(old_values),
            Some(new_values),
            None,
        )
        .await
    }

    /// Lists recent entries for a table, newest first, for the admin audit endpoint.
    pub async fn list_for_table(&self, table_name: &str, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, table_name, record_id, entity_type, entity_id, action,
                   old_values, new_values, payload, user_id, created_at
            FROM audit_entries
            WHERE table_name = $1 OR entity_type = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(table_name)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_for_record(&self, table_name: &str, record_id: Uuid) -> AppResult<Vec<AuditEntry>> {
        let record_id = record_id.to_string();
        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, table_name, record_id, entity_type, entity_id, action,
                   old_values, new_values, payload, user_id, created_at
            FROM audit_entries
            WHERE (table_name = $1 AND record_id = $2) OR (entity_type = $1 AND entity_id = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(table_name)
        .bind(&record_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// General-purpose listing for the admin audit endpoint: any combination
    /// of `table_name`/`record_id`/`action`, all optional, newest first.
    pub async fn list_filtered(&self, filter: &AuditListFilter, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, table_name, record_id, entity_type, entity_id, action,
                   old_values, new_values, payload, user_id, created_at
            FROM audit_entries
            WHERE ($1::text IS NULL OR table_name = $1 OR entity_type = $1)
              AND ($2::text IS NULL OR record_id = $2 OR entity_id = $2)
              AND ($3::text IS NULL OR action = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(&filter.table_name)
        .bind(&filter.record_id)
        .bind(&filter.action)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
