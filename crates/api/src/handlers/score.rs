//! Handlers for defense scores under `/projects/{id}/scores`.

use axum::extract::{Path, State};
use axum::Json;
use capstone_core::types::DbId;
use capstone_db::models::score::{ScoreDetail, ScoreOutcome};
use capstone_db::repositories::{LifecycleRepo, ScoreRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::project::load_visible;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProfessor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /projects/{id}/scores`.
#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    /// The caller's seat on the project's council.
    pub council_member_id: DbId,
    /// 0.0 to 10.0 inclusive.
    pub value: f64,
    pub comment: Option<String>,
}

/// GET /api/v1/projects/{id}/scores
///
/// Every score recorded so far, with the scorer's name and seat role.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ScoreDetail>>>> {
    load_visible(&state, &auth.actor(), id).await?;
    let scores = ScoreRepo::list_details(&state.pool, id).await?;
    Ok(Json(DataResponse::new(scores)))
}

/// PUT /api/v1/projects/{id}/scores
///
/// Record or overwrite the caller's score. The response says whether this
/// submission completed the project and, if so, its final score.
pub async fn submit(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitScoreRequest>,
) -> AppResult<Json<DataResponse<ScoreOutcome>>> {
    let outcome = LifecycleRepo::submit_score(
        &state.pool,
        &state.event_bus,
        &professor.actor(),
        id,
        input.council_member_id,
        input.value,
        input.comment.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse::new(outcome)))
}
