//! Handlers for the `/admin` resource (users, system config, statistics).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use capstone_core::audit::{action_types, entities};
use capstone_core::error::CoreError;
use capstone_core::project::validate_academic_term;
use capstone_core::roles::{is_valid_role, ROLE_ADMIN, ROLE_PROFESSOR, ROLE_STUDENT};
use capstone_core::types::DbId;
use capstone_db::models::audit::CreateAuditLog;
use capstone_db::models::project::{ProjectStatistics, StatisticsScope};
use capstone_db::models::system_config::{
    AcademicTerm, SystemConfig, KEY_CURRENT_SEMESTER, KEY_CURRENT_YEAR,
};
use capstone_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use capstone_db::repositories::{
    AuditLogRepo, ProjectRepo, RoleRepo, SystemConfigRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::YearParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub student_code: Option<String>,
    /// Role name: `admin`, `professor` or `student`.
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub student_code: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
}

/// Outcome of `DELETE /admin/users/{id}`.
///
/// Students who still own projects are deactivated rather than removed.
#[derive(Debug, Serialize)]
pub struct UserRemoval {
    pub id: DbId,
    pub deleted: bool,
    pub deactivated: bool,
}

/// Request body for `PUT /admin/config`. Absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateTermRequest {
    pub current_year: Option<i32>,
    pub current_semester: Option<i16>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a user. Validates password strength, hashes it, and returns a
/// safe [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let username = input.username.trim();
    if username.is_empty() || input.full_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and full name are required".into(),
        )));
    }

    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role_id = role_id_for(&state, &input.role).await?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: username.to_string(),
        email: input.email,
        password_hash: hashed,
        full_name: input.full_name.trim().to_string(),
        phone: input.phone,
        major: input.major,
        student_code: input.student_code,
        role_id,
    };

    let user = UserRepo::create(&state.pool, &create_dto).await?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(admin.user_id, action_types::USER_CREATE, entities::USER, user.id)
            .with_details(json!({ "username": user.username, "role": input.role })),
    )
    .await?;
    tracing::info!(admin_id = admin.user_id, user_id = user.id, "User created");

    let response = UserResponse::from_user(&user, input.role);
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// GET /api/v1/admin/users?role=
///
/// List users with resolved role names, optionally limited to one role.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let role_filter = match params.role.as_deref() {
        Some(role) => Some(role_id_for(&state, role).await?),
        None => None,
    };
    let users = UserRepo::list(&state.pool, role_filter).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse::new(responses)))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse::new(response)))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields, role, or the active flag (not the password).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role_id = match input.role.as_deref() {
        Some(role) => Some(role_id_for(&state, role).await?),
        None => None,
    };

    let update_dto = UpdateUser {
        email: input.email,
        full_name: input.full_name,
        phone: input.phone,
        major: input.major,
        student_code: input.student_code,
        role_id,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(admin.user_id, action_types::USER_UPDATE, entities::USER, id),
    )
    .await?;

    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse::new(response)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Administrators are never deleted. Professors who supervise projects or
/// sit on councils are refused; students who own projects are deactivated.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserRemoval>>> {
    let user = find_user(&state, id).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let deps = UserRepo::dependencies(&state.pool, id).await?;

    let removal = match role.as_str() {
        ROLE_ADMIN => {
            return Err(AppError::Core(CoreError::Conflict(
                "Administrator accounts cannot be deleted".into(),
            )));
        }
        ROLE_PROFESSOR if deps.supervised_projects > 0 || deps.council_seats > 0 => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Professor supervises {} project(s) and holds {} council seat(s)",
                deps.supervised_projects, deps.council_seats
            ))));
        }
        ROLE_STUDENT if deps.owned_projects > 0 => {
            UserRepo::deactivate(&state.pool, id).await?;
            UserRemoval {
                id,
                deleted: false,
                deactivated: true,
            }
        }
        _ => {
            UserRepo::delete(&state.pool, id).await?;
            UserRemoval {
                id,
                deleted: true,
                deactivated: false,
            }
        }
    };

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(admin.user_id, action_types::USER_DELETE, entities::USER, id)
            .with_details(json!({ "deleted": removal.deleted })),
    )
    .await?;
    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        deleted = removal.deleted,
        "User removed"
    );

    Ok(Json(DataResponse::new(removal)))
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Set a new password. Also clears any lock-out.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let updated = UserRepo::update_password(&state.pool, id, &hashed).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(admin.user_id, action_types::PASSWORD_RESET, entities::USER, id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// System config
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/config
pub async fn list_config(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<SystemConfig>>>> {
    let configs = SystemConfigRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(configs)))
}

/// PUT /api/v1/admin/config
///
/// Change the academic term new submissions are filed under.
pub async fn update_term(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<UpdateTermRequest>,
) -> AppResult<Json<DataResponse<AcademicTerm>>> {
    let current = SystemConfigRepo::academic_term(&state.pool).await?;
    let term = AcademicTerm {
        year: input.current_year.unwrap_or(current.year),
        semester: input.current_semester.unwrap_or(current.semester),
    };
    validate_academic_term(term.year, term.semester)?;

    let changes = [
        (KEY_CURRENT_YEAR, input.current_year.map(|y| y.to_string())),
        (
            KEY_CURRENT_SEMESTER,
            input.current_semester.map(|s| s.to_string()),
        ),
    ];
    for (key, value) in changes {
        let Some(value) = value else { continue };
        let config = SystemConfigRepo::set(&state.pool, key, &value, None).await?;
        AuditLogRepo::record(
            &state.pool,
            &CreateAuditLog::new(
                admin.user_id,
                action_types::CONFIG_CHANGE,
                entities::SYSTEM_CONFIG,
                config.id,
            )
            .with_details(json!({ "key": key, "value": value })),
        )
        .await?;
    }

    tracing::info!(
        admin_id = admin.user_id,
        year = term.year,
        semester = term.semester,
        "Academic term updated"
    );
    Ok(Json(DataResponse::new(term)))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/statistics?year=
pub async fn statistics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<YearParams>,
) -> AppResult<Json<DataResponse<ProjectStatistics>>> {
    let scope = StatisticsScope {
        year: params.year,
        ..Default::default()
    };
    let stats = ProjectRepo::statistics(&state.pool, scope).await?;
    Ok(Json(DataResponse::new(stats)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Resolve a role name to its id, rejecting unknown names.
async fn role_id_for(state: &AppState, role: &str) -> AppResult<DbId> {
    if !is_valid_role(role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role '{role}'"
        ))));
    }
    RoleRepo::find_by_name(&state.pool, role)
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{role}'"))))
}

/// Convert a [`User`] to a [`UserResponse`] by resolving the role name.
async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}
