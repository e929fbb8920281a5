//! Repository for the `audit_logs` table.
//!
//! Inserts run inside the transaction of the action they describe so an
//! audit row exists exactly when the action committed.

use sqlx::PgPool;

use super::{clamp_limit, clamp_offset};
use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, action_type, entity_type, entity_id, details_json, created_at";

/// Shared filter for [`AuditLogRepo::query`] and [`AuditLogRepo::count`].
const FILTER: &str = "\
    WHERE ($1::BIGINT IS NULL OR user_id = $1) \
      AND ($2::TEXT IS NULL OR action_type = $2) \
      AND ($3::TEXT IS NULL OR entity_type = $3) \
      AND ($4::BIGINT IS NULL OR entity_id = $4)";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides query and insert operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn insert(tx: &mut Tx<'_>, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (user_id, action_type, entity_type, entity_id, details_json) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.user_id)
            .bind(entry.action_type)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.details_json)
            .fetch_one(&mut **tx)
            .await
    }

    /// Record an entry outside any lifecycle transaction (logins, admin edits).
    pub async fn record(pool: &PgPool, entry: &CreateAuditLog) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::insert(&mut tx, entry).await?;
        tx.commit().await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {FILTER} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(params.user_id)
            .bind(&params.action_type)
            .bind(&params.entity_type)
            .bind(params.entity_id)
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Count audit logs matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT AS count FROM audit_logs {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.user_id)
            .bind(&params.action_type)
            .bind(&params.entity_type)
            .bind(params.entity_id)
            .fetch_one(pool)
            .await
    }
}
