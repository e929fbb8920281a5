//! Handlers for the audit trail. Admin only.

use axum::extract::{Query, State};
use axum::Json;
use capstone_core::audit::is_known_action;
use capstone_db::models::audit::{AuditLogPage, AuditQuery};
use capstone_db::repositories::AuditLogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/audit-logs
///
/// Filter by actor, action or entity, newest first, with the total count
/// of matching entries for pagination.
pub async fn query_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<AuditLogPage>>> {
    if let Some(action) = params.action_type.as_deref() {
        if !is_known_action(action) {
            return Err(AppError::BadRequest(format!(
                "Unknown action type '{action}'"
            )));
        }
    }

    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;

    Ok(Json(DataResponse::new(AuditLogPage { items, total })))
}
