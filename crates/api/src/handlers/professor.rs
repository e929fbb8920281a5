//! Handlers for the `/professor` resource: a professor's own dashboard.

use axum::extract::{Query, State};
use axum::Json;
use capstone_db::models::council::ProfessorSeat;
use capstone_db::models::project::{ProjectStatistics, StatisticsScope};
use capstone_db::repositories::{CouncilMemberRepo, ProjectRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireProfessor;
use crate::query::YearParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/professor/statistics?year=
///
/// Counts by status and year and the mean final score, over the projects
/// the caller supervises.
pub async fn statistics(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Query(params): Query<YearParams>,
) -> AppResult<Json<DataResponse<ProjectStatistics>>> {
    let scope = StatisticsScope {
        year: params.year,
        professor_id: Some(professor.user_id),
    };
    let stats = ProjectRepo::statistics(&state.pool, scope).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/v1/professor/seats
///
/// The caller's council seats. The seat id is what score submissions
/// carry as `council_member_id`.
pub async fn seats(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
) -> AppResult<Json<DataResponse<Vec<ProfessorSeat>>>> {
    let seats = CouncilMemberRepo::list_for_professor(&state.pool, professor.user_id).await?;
    Ok(Json(DataResponse::new(seats)))
}
