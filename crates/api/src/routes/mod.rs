pub mod admin;
pub mod auth;
pub mod council;
pub mod health;
pub mod message;
pub mod notification;
pub mod professor;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/register                                   student sign-up (public)
/// /auth/me                                         current user
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, delete
/// /admin/users/{id}/reset-password                 reset password
/// /admin/config                                    academic term
/// /admin/statistics                                project counts, mean score
/// /admin/audit-logs                                audit trail
/// /admin/export/projects                           CSV register
///
/// /projects                                        list, submit
/// /projects/{id}                                   get, delete (owner)
/// /projects/{id}/approve                           approve (supervisor)
/// /projects/{id}/reject                            reject (supervisor)
/// /projects/{id}/professor                         assign supervisor (admin)
/// /projects/{id}/council                           assign council (admin)
/// /projects/{id}/comments                          list, add
/// /projects/{id}/progress                          list, report
/// /projects/{id}/scores                            list, submit
///
/// /councils                                        list, create
/// /councils/{id}                                   get with seats and docket
/// /councils/{id}/members                           add seat
///
/// /professor/statistics                            own supervision stats
/// /professor/seats                                 own council seats
///
/// /messages                                        list, send
/// /messages/unread-count                           unread count
/// /messages/{id}/read                              mark one read
///
/// /notifications                                   list
/// /notifications/read-all                          mark all read
/// /notifications/unread-count                      unread count
/// /notifications/{id}/read                         mark one read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, current user).
        .nest("/auth", auth::router())
        // Admin routes (users, config, statistics, audit, export).
        .nest("/admin", admin::router())
        // Project lifecycle, comments, progress, scores.
        .nest("/projects", project::router())
        // Defense councils and their seats.
        .nest("/councils", council::router())
        // A professor's own statistics and seats.
        .nest("/professor", professor::router())
        // Direct messages between users.
        .nest("/messages", message::router())
        // Per-user notifications.
        .nest("/notifications", notification::router())
}
