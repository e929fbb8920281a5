//! Score entity model.

use capstone_core::scoring::ScoreEntry;
use capstone_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `scores` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Score {
    pub id: DbId,
    pub project_id: DbId,
    pub council_member_id: DbId,
    pub value: f64,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Score {
    pub fn entry(&self) -> ScoreEntry {
        ScoreEntry {
            council_member_id: self.council_member_id,
            value: self.value,
        }
    }
}

/// A score joined with the seat and professor that gave it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScoreDetail {
    pub id: DbId,
    pub project_id: DbId,
    pub council_member_id: DbId,
    pub professor_id: DbId,
    pub professor_name: String,
    pub member_role: String,
    pub value: f64,
    pub comment: Option<String>,
    pub updated_at: Timestamp,
}

/// Result of a score submission: the stored row and the project's state
/// after any completion.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub score: Score,
    pub completed: bool,
    pub final_score: Option<f64>,
}
