//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods meant to run inside a
//! caller's transaction take `&mut Transaction<'_, Postgres>` instead.
//! [`LifecycleRepo`] owns those transactions for the lifecycle operations.

pub mod audit_repo;
pub mod comment_repo;
pub mod council_repo;
pub mod lifecycle_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod progress_repo;
pub mod project_repo;
pub mod role_repo;
pub mod score_repo;
pub mod system_config_repo;
pub mod user_repo;

pub use audit_repo::AuditLogRepo;
pub use comment_repo::CommentRepo;
pub use council_repo::{CouncilMemberRepo, CouncilRepo};
pub use lifecycle_repo::{LifecycleRepo, NewProject};
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use progress_repo::ProgressRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use score_repo::ScoreRepo;
pub use system_config_repo::SystemConfigRepo;
pub use user_repo::UserRepo;

/// Default page size for list queries.
pub(crate) const DEFAULT_LIMIT: i64 = 50;
/// Upper bound on any page size.
pub(crate) const MAX_LIMIT: i64 = 500;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Negative offsets become zero.
pub(crate) fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
