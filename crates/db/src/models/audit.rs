//! Audit log entity models and DTOs.
//!
//! Audit rows are append-only; nothing updates them after insert.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub user_id: Option<DbId>,
    pub action_type: &'static str,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
}

impl CreateAuditLog {
    /// An action by `user_id` on one entity.
    pub fn new(
        user_id: DbId,
        action_type: &'static str,
        entity_type: &'static str,
        entity_id: DbId,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            action_type,
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
            details_json: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details_json = Some(details);
        self
    }
}

/// Filter parameters for querying audit logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<DbId>,
    pub action_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated audit log response.
#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub items: Vec<AuditLog>,
    pub total: i64,
}
