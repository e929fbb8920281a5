//! Handlers for the `/councils` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use capstone_core::council::SeatRequest;
use capstone_core::error::CoreError;
use capstone_core::types::DbId;
use capstone_db::models::council::{Council, CouncilMember, CouncilDetail, CreateCouncil};
use capstone_db::repositories::{CouncilRepo, LifecycleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/councils
///
/// Create a council with its seats and optionally assign projects to it.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCouncil>,
) -> AppResult<(StatusCode, Json<DataResponse<CouncilDetail>>)> {
    let council =
        LifecycleRepo::create_council(&state.pool, &state.event_bus, &admin.actor(), &input)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(council))))
}

/// GET /api/v1/councils
///
/// Administrators see every council; professors only those they sit on.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Council>>>> {
    let actor = auth.actor();
    if actor.is_student() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Students cannot browse councils".into(),
        )));
    }
    let professor_filter = (!actor.is_admin()).then_some(actor.user_id);
    let councils = CouncilRepo::list(&state.pool, professor_filter).await?;
    Ok(Json(DataResponse::new(councils)))
}

/// GET /api/v1/councils/{id}
///
/// The council with its seats and its docket of projects and scores.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CouncilDetail>>> {
    let actor = auth.actor();
    if actor.is_student() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Students cannot view councils".into(),
        )));
    }

    let council = CouncilRepo::detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Council",
            id,
        }))?;

    let seated = council
        .members
        .iter()
        .any(|m| m.professor_id == actor.user_id);
    if !actor.is_admin() && !seated {
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "You do not sit on council {id}"
        ))));
    }

    Ok(Json(DataResponse::new(council)))
}

/// POST /api/v1/councils/{id}/members
///
/// Refused once any score has been recorded against the council.
pub async fn add_member(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SeatRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CouncilMember>>)> {
    let member =
        LifecycleRepo::add_council_member(&state.pool, &state.event_bus, &admin.actor(), id, &input)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}
