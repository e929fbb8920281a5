//! Handlers for the `/auth` resource (login, self-registration, current user).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use capstone_core::audit::{action_types, entities};
use capstone_core::error::CoreError;
use capstone_db::models::audit::CreateAuditLog;
use capstone_core::roles::ROLE_STUDENT;
use capstone_db::models::user::{CreateUser, UserResponse};
use capstone_db::repositories::{AuditLogRepo, RoleRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins that lock an account.
pub const MAX_FAILED_ATTEMPTS: i32 = 3;

/// How long a locked account stays locked.
pub const LOCK_DURATION_MINS: i64 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/register`. Self-registration always
/// creates a student account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub student_code: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password and receive an access token.
/// Three consecutive failures lock the account for five minutes.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, until).await?;
            AuditLogRepo::record(
                &state.pool,
                &CreateAuditLog::new(
                    user.id,
                    action_types::LOGIN_LOCKED,
                    entities::USER,
                    user.id,
                )
                .with_details(json!({ "locked_until": until })),
            )
            .await?;
            tracing::warn!(user_id = user.id, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let access_token = generate_access_token(user.id, &role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(user.id, action_types::LOGIN, entities::USER, user.id),
    )
    .await?;
    tracing::info!(user_id = user.id, role = %role, "User logged in");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from_user(&user, role),
    }))
}

/// POST /api/v1/auth/register
///
/// Public sign-up for students. Staff accounts are created by an
/// administrator. A taken username or email is a 409.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let username = input.username.trim();
    let student_code = input.student_code.trim();
    if username.is_empty() || input.full_name.trim().is_empty() || student_code.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username, full name and student code are required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role_id = RoleRepo::find_by_name(&state.pool, ROLE_STUDENT)
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::InternalError("Student role is not seeded".into()))?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: input.email,
            password_hash,
            full_name: input.full_name.trim().to_string(),
            phone: input.phone,
            major: input.major,
            student_code: Some(student_code.to_string()),
            role_id,
        },
    )
    .await?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(user.id, action_types::USER_REGISTER, entities::USER, user.id)
            .with_details(json!({ "username": user.username })),
    )
    .await?;
    tracing::info!(user_id = user.id, "Student registered");

    let response = UserResponse::from_user(&user, ROLE_STUDENT.to_string());
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// GET /api/v1/auth/me
///
/// Profile of the authenticated user.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    Ok(Json(DataResponse::new(UserResponse::from_user(&user, role))))
}
