//! System configuration key/value model.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Config key for the academic year stamped on new projects.
pub const KEY_CURRENT_YEAR: &str = "current_year";
/// Config key for the semester stamped on new projects.
pub const KEY_CURRENT_SEMESTER: &str = "current_semester";

/// A row from the `system_configs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemConfig {
    pub id: DbId,
    pub config_key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The academic term new projects are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub year: i32,
    pub semester: i16,
}
