//! Route definitions for the `/professor` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::professor;
use crate::state::AppState;

/// Routes mounted at `/professor`. All require the `professor` role.
///
/// ```text
/// GET    /statistics                -> statistics
/// GET    /seats                     -> seats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(professor::statistics))
        .route("/seats", get(professor::seats))
}
