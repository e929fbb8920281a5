//! Project progress report model.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectProgress {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    pub percentage: i32,
    pub updated_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a new progress report.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgress {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub percentage: i32,
}
