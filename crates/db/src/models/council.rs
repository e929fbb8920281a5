//! Council and council-seat models.

use capstone_core::council::{CouncilRole, SeatRequest};
use capstone_core::error::CoreError;
use capstone_core::scoring::Seat;
use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::score::ScoreDetail;

/// A row from the `councils` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Council {
    pub id: DbId,
    pub name: String,
    pub defense_date: Timestamp,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `council_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CouncilMember {
    pub id: DbId,
    pub council_id: DbId,
    pub professor_id: DbId,
    pub role: String,
    pub assigned_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouncilMember {
    pub fn council_role(&self) -> Result<CouncilRole, CoreError> {
        CouncilRole::parse(&self.role)
    }

    /// The seat as the scoring rules see it.
    pub fn seat(&self) -> Seat {
        Seat {
            id: self.id,
            council_id: self.council_id,
            professor_id: self.professor_id,
        }
    }
}

/// A council seat joined with the professor's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CouncilMemberDetail {
    pub id: DbId,
    pub council_id: DbId,
    pub professor_id: DbId,
    pub professor_name: String,
    pub role: String,
    pub assigned_at: Timestamp,
}

/// A project on a council's docket, with its student.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CouncilProjectRow {
    pub id: DbId,
    pub title: String,
    pub student_id: DbId,
    pub student_name: String,
    pub student_code: Option<String>,
    /// Status name, e.g. `in_progress`.
    pub status: String,
    pub defense_date: Option<Timestamp>,
    pub final_score: Option<f64>,
}

/// A docket entry together with the scores recorded so far.
#[derive(Debug, Clone, Serialize)]
pub struct CouncilProject {
    #[serde(flatten)]
    pub project: CouncilProjectRow,
    pub scores: Vec<ScoreDetail>,
}

/// A council with its seats and the projects it evaluates, for detail
/// views.
#[derive(Debug, Clone, Serialize)]
pub struct CouncilDetail {
    #[serde(flatten)]
    pub council: Council,
    pub members: Vec<CouncilMemberDetail>,
    pub projects: Vec<CouncilProject>,
}

/// One seat held by a professor, with the council it belongs to. The `id`
/// is the `council_member_id` used when scoring.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessorSeat {
    pub id: DbId,
    pub council_id: DbId,
    pub council_name: String,
    pub defense_date: Timestamp,
    pub location: Option<String>,
    pub role: String,
    pub assigned_at: Timestamp,
}

/// DTO for creating a council together with its seats and the projects it
/// will evaluate.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCouncil {
    pub name: String,
    pub defense_date: Timestamp,
    pub location: Option<String>,
    pub description: Option<String>,
    pub members: Vec<SeatRequest>,
    #[serde(default)]
    pub project_ids: Vec<DbId>,
}
