//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{project, score};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create (student)
/// GET    /{id}                  -> get_by_id
/// DELETE /{id}                  -> delete (owner, pending or rejected)
/// POST   /{id}/approve          -> approve (supervisor)
/// POST   /{id}/reject           -> reject (supervisor)
/// PUT    /{id}/professor        -> assign_professor (admin)
/// PUT    /{id}/council          -> assign_council (admin)
///
/// GET    /{id}/comments         -> list_comments
/// POST   /{id}/comments         -> add_comment (supervisor)
/// GET    /{id}/progress         -> list_progress
/// POST   /{id}/progress         -> add_progress (owner)
///
/// GET    /{id}/scores           -> score::list
/// PUT    /{id}/scores           -> score::submit (council member)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).delete(project::delete))
        .route("/{id}/approve", post(project::approve))
        .route("/{id}/reject", post(project::reject))
        .route("/{id}/professor", put(project::assign_professor))
        .route("/{id}/council", put(project::assign_council))
        .route(
            "/{id}/comments",
            get(project::list_comments).post(project::add_comment),
        )
        .route(
            "/{id}/progress",
            get(project::list_progress).post(project::add_progress),
        )
        .route("/{id}/scores", get(score::list).put(score::submit))
}
