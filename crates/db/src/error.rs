use capstone_core::error::CoreError;

/// Failure of a transactional lifecycle operation.
///
/// Either a domain rule refused the change, or the database did. In both
/// cases the transaction has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
