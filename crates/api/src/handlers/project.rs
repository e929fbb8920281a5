//! Handlers for the `/projects` resource and its comments and progress log.
//!
//! State changes go through [`LifecycleRepo`], which enforces the lifecycle
//! rules inside one transaction and publishes events after commit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use capstone_core::actor::ActorContext;
use capstone_core::error::CoreError;
use capstone_core::project::can_view;
use capstone_core::status::ProjectStatus;
use capstone_core::types::{DbId, Timestamp};
use capstone_db::models::comment::ProfessorComment;
use capstone_db::models::progress::{CreateProgress, ProjectProgress};
use capstone_db::models::project::{Project, ProjectFilter, ProjectResponse};
use capstone_db::repositories::{
    CommentRepo, LifecycleRepo, NewProject, ProgressRepo, ProjectRepo,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireProfessor, RequireStudent};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    /// Status name, e.g. `pending` or `in_progress`.
    pub status: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<i16>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /projects/{id}/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Request body for `PUT /projects/{id}/professor`.
#[derive(Debug, Deserialize)]
pub struct AssignProfessorRequest {
    pub professor_id: DbId,
}

/// Request body for `PUT /projects/{id}/council`.
#[derive(Debug, Deserialize)]
pub struct AssignCouncilRequest {
    pub council_id: DbId,
    pub defense_date: Timestamp,
}

/// Request body for `POST /projects/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub comment_text: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Submit a proposal. The project starts Pending in the configured term.
pub async fn create(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Json(input): Json<NewProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectResponse>>)> {
    let project =
        LifecycleRepo::create_project(&state.pool, &state.event_bus, &student.actor(), &input)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(respond(project)?))))
}

/// GET /api/v1/projects
///
/// Students see their own projects, professors those they supervise or
/// evaluate, administrators everything.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<ProjectResponse>>>> {
    let status_id = match params.status.as_deref() {
        Some(name) => Some(
            ProjectStatus::from_name(name)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!("Unknown status '{name}'")))
                })?
                .id(),
        ),
        None => None,
    };

    let actor = auth.actor();
    let mut filter = ProjectFilter {
        status_id,
        year: params.year,
        semester: params.semester,
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    if actor.is_student() {
        filter.student_id = Some(actor.user_id);
    } else if actor.is_professor() {
        filter.involving_professor_id = Some(actor.user_id);
    }

    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    let responses = projects
        .into_iter()
        .map(respond)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse::new(responses)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectResponse>>> {
    let project = load_visible(&state, &auth.actor(), id).await?;
    Ok(Json(DataResponse::new(respond(project)?)))
}

/// DELETE /api/v1/projects/{id}
///
/// The owning student withdraws a Pending or Rejected proposal.
pub async fn delete(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    LifecycleRepo::delete_project(&state.pool, &state.event_bus, &student.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectResponse>>> {
    let project =
        LifecycleRepo::approve(&state.pool, &state.event_bus, &professor.actor(), id).await?;
    Ok(Json(DataResponse::new(respond(project)?)))
}

/// POST /api/v1/projects/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<ProjectResponse>>> {
    let project = LifecycleRepo::reject(
        &state.pool,
        &state.event_bus,
        &professor.actor(),
        id,
        &input.reason,
    )
    .await?;
    Ok(Json(DataResponse::new(respond(project)?)))
}

/// PUT /api/v1/projects/{id}/professor
pub async fn assign_professor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignProfessorRequest>,
) -> AppResult<Json<DataResponse<ProjectResponse>>> {
    let project = LifecycleRepo::assign_professor(
        &state.pool,
        &state.event_bus,
        &admin.actor(),
        id,
        input.professor_id,
    )
    .await?;
    Ok(Json(DataResponse::new(respond(project)?)))
}

/// PUT /api/v1/projects/{id}/council
///
/// Schedule the defense. Only Approved or InProgress projects qualify.
pub async fn assign_council(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignCouncilRequest>,
) -> AppResult<Json<DataResponse<ProjectResponse>>> {
    let project = LifecycleRepo::assign_council(
        &state.pool,
        &state.event_bus,
        &admin.actor(),
        id,
        input.council_id,
        input.defense_date,
    )
    .await?;
    Ok(Json(DataResponse::new(respond(project)?)))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProfessorComment>>>> {
    load_visible(&state, &auth.actor(), id).await?;
    let comments = CommentRepo::list_for_project(&state.pool, id).await?;
    Ok(Json(DataResponse::new(comments)))
}

/// POST /api/v1/projects/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<AddCommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProfessorComment>>)> {
    let comment = LifecycleRepo::add_comment(
        &state.pool,
        &state.event_bus,
        &professor.actor(),
        id,
        &input.comment_text,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(comment))))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/progress
pub async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectProgress>>>> {
    load_visible(&state, &auth.actor(), id).await?;
    let entries = ProgressRepo::list_for_project(&state.pool, id).await?;
    Ok(Json(DataResponse::new(entries)))
}

/// POST /api/v1/projects/{id}/progress
///
/// Percentages must strictly increase over the latest report.
pub async fn add_progress(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
    Json(input): Json<CreateProgress>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectProgress>>)> {
    let entry =
        LifecycleRepo::record_progress(&state.pool, &state.event_bus, &student.actor(), id, &input)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(entry))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn respond(project: Project) -> AppResult<ProjectResponse> {
    Ok(ProjectResponse::try_from(project)?)
}

/// Load a project the actor is allowed to read.
///
/// Missing projects are 404; projects the actor has no part in are 401.
pub(crate) async fn load_visible(
    state: &AppState,
    actor: &ActorContext,
    id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    let snapshot = project.snapshot()?;

    let sits_on_council =
        actor.is_professor() && ProjectRepo::is_council_member(&state.pool, id, actor.user_id).await?;
    if !can_view(&snapshot, actor, sits_on_council) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "You are not involved in this project".into(),
        )));
    }
    Ok(project)
}
