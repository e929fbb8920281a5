use crate::types::DbId;

/// Domain error shared by every layer.
///
/// `Unauthorized` is used when the caller is authenticated but does not own
/// the resource being mutated (e.g. a professor approving somebody else's
/// project). `Forbidden` is used when the caller's role cannot perform the
/// operation at all.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
