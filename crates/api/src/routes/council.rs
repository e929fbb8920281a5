//! Route definitions for the `/councils` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::council;
use crate::state::AppState;

/// Routes mounted at `/councils`.
///
/// ```text
/// GET    /               -> list (admin: all, professor: own seats)
/// POST   /               -> create (admin)
/// GET    /{id}           -> get_by_id
/// POST   /{id}/members   -> add_member (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(council::list).post(council::create))
        .route("/{id}", get(council::get_by_id))
        .route("/{id}/members", post(council::add_member))
}
