//! Supervisor comment model.

use capstone_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `professor_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessorComment {
    pub id: DbId,
    pub project_id: DbId,
    pub professor_id: DbId,
    pub comment_text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
