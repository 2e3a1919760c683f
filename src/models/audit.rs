//! Audit log models
//!
//! Append-only: for each `(table_name, record_id)` pair the sequence of
//! actions starts with `INSERT` and never has an `INSERT` after a `DELETE`.
//!
//! The audit log is dual-schema tolerant: some rows may have been written
//! under an older `(entity_type, entity_id, payload)` layout. [`AuditEntry`]
//! is the canonical in-memory shape; [`AuditEntryRow`] handles reading either
//! layout back out of the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub table_name: String,
    pub record_id: String,
    pub action: AuditAction,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw row shape tolerant of either the current `(table_name, record_id, ...)`
/// columns or the legacy `(entity_type, entity_id, payload)` columns. Exactly
/// one of the two column groups is expected to be non-null per row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditEntryRow {
    pub id: Uuid,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: AuditAction,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub payload: Option<Value>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEntryRow> for AuditEntry {
    fn from(row: AuditEntryRow) -> Self {
        let table_name = row
            .table_name
            .or(row.entity_type)
            .unwrap_or_else(|| "unknown".to_string());
        let record_id = row
            .record_id
            .or(row.entity_id)
            .unwrap_or_else(|| "unknown".to_string());

        // Legacy rows bundle old/new under a single `payload` column; fold it
        // into `new_values` so callers see one consistent shape.
        let (old_values, new_values) = if row.old_values.is_some() || row.new_values.is_some() {
            (row.old_values, row.new_values)
        } else {
            (None, row.payload)
        };

        Self {
            id: row.id,
            table_name,
            record_id,
            action: row.action,
            old_values,
            new_values,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListFilter {
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub action: Option<AuditAction>,
}
