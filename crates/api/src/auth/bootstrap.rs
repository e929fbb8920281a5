//! First-run administrator provisioning.

use capstone_core::roles::ROLE_ADMIN;
use capstone_db::models::user::CreateUser;
use capstone_db::repositories::{RoleRepo, UserRepo};
use capstone_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured administrator if no admin account exists yet.
///
/// Returns `true` when an account was created. An existing admin, of any
/// name, leaves the table untouched.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError("admin role is not seeded".into()))?;

    if UserRepo::count_by_role(pool, role.id).await? > 0 {
        return Ok(false);
    }

    validate_password_strength(&admin.password).map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: None,
            password_hash,
            full_name: "Administrator".into(),
            phone: None,
            major: None,
            student_code: None,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap administrator created");
    Ok(true)
}
