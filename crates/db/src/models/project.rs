//! Project entity model and DTOs.

use capstone_core::error::CoreError;
use capstone_core::lifecycle::ProjectSnapshot;
use capstone_core::status::ProjectStatus;
use capstone_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub student_id: DbId,
    pub professor_id: Option<DbId>,
    pub status_id: StatusId,
    pub year: i32,
    pub semester: i16,
    pub start_date: Option<Timestamp>,
    pub defense_date: Option<Timestamp>,
    pub council_id: Option<DbId>,
    pub final_score: Option<f64>,
    pub professor_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Decode `status_id`. An unknown id means the lookup table and the
    /// enum have drifted apart.
    pub fn status(&self) -> Result<ProjectStatus, CoreError> {
        ProjectStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Project {} has unknown status_id {}",
                self.id, self.status_id
            ))
        })
    }

    /// The fields the lifecycle rules need.
    pub fn snapshot(&self) -> Result<ProjectSnapshot, CoreError> {
        Ok(ProjectSnapshot {
            id: self.id,
            title: self.title.clone(),
            student_id: self.student_id,
            professor_id: self.professor_id,
            status: self.status()?,
            council_id: self.council_id,
        })
    }
}

/// API representation: the row plus its decoded status name.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub status: ProjectStatus,
}

impl TryFrom<Project> for ProjectResponse {
    type Error = CoreError;

    fn try_from(project: Project) -> Result<Self, Self::Error> {
        let status = project.status()?;
        Ok(Self { project, status })
    }
}

/// DTO for inserting a new project. Status is always Pending.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub student_id: DbId,
    pub professor_id: Option<DbId>,
    pub year: i32,
    pub semester: i16,
}

/// Filters for listing projects. `None` fields do not filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProjectFilter {
    pub status_id: Option<StatusId>,
    pub year: Option<i32>,
    pub semester: Option<i16>,
    pub student_id: Option<DbId>,
    /// Projects supervised by, or evaluated by a council seating, this user.
    pub involving_professor_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Count of projects in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status_id: StatusId,
    pub count: i64,
}

/// Count of projects filed under one academic year.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: i64,
}

/// Which projects the dashboard figures cover. `None` fields do not filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsScope {
    pub year: Option<i32>,
    /// Only projects this professor supervises.
    pub professor_id: Option<DbId>,
}

/// Dashboard figures: the whole register for administrators, the
/// supervised projects for a professor.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatistics {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub average_final_score: Option<f64>,
    pub by_year: Vec<YearCount>,
}

/// One joined row for the CSV export.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectExportRecord {
    pub student_code: Option<String>,
    pub student_name: String,
    pub title: String,
    pub supervisor_name: Option<String>,
    pub status_id: StatusId,
    pub final_score: Option<f64>,
    pub year: i32,
    pub semester: i16,
}
