//! CSV export of the project register. Admin only.

use axum::extract::{Query, State};
use axum::http::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use capstone_core::error::CoreError;
use capstone_core::export::{export_filename, render_csv, ProjectExportRow};
use capstone_core::status::ProjectStatus;
use capstone_db::models::project::ProjectExportRecord;
use capstone_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::YearParams;
use crate::state::AppState;

/// GET /api/v1/admin/export/projects?year=
///
/// Download every project, optionally limited to one academic year.
pub async fn export_projects(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<YearParams>,
) -> AppResult<(StatusCode, [(HeaderName, String); 2], String)> {
    let records = ProjectRepo::export_rows(&state.pool, params.year).await?;
    let rows = records
        .into_iter()
        .map(to_row)
        .collect::<Result<Vec<_>, CoreError>>()?;
    let csv = render_csv(&rows);

    tracing::info!(
        admin_id = admin.user_id,
        year = ?params.year,
        rows = rows.len(),
        "Project register exported"
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename(params.year)),
            ),
        ],
        csv,
    ))
}

fn to_row(record: ProjectExportRecord) -> Result<ProjectExportRow, CoreError> {
    let status = ProjectStatus::from_id(record.status_id).ok_or_else(|| {
        CoreError::Internal(format!("Unknown status_id {}", record.status_id))
    })?;
    Ok(ProjectExportRow {
        student_code: record.student_code,
        student_name: record.student_name,
        title: record.title,
        supervisor_name: record.supervisor_name,
        status,
        final_score: record.final_score,
        year: record.year,
        semester: record.semester,
    })
}
