/// Lifecycle Engines
///
/// This module owns every status write for tasks and projects. Route handlers
/// never set a `status` column themselves; they call into `lifecycle::task`
/// and `lifecycle::project`, which bundle the row update, the append-only
/// history insert and any cross-entity cascade into one transaction.
///
/// Notifications are deliberately *not* part of those transactions: they are
/// fired after commit on a best-effort basis and a failure only logs a
/// warning.
pub mod project;
pub mod task;

use sea_orm::DbErr;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors that can occur while driving a task or project through its lifecycle
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The target row does not exist, or is not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// The caller is known but the operation's gate is not satisfied.
    #[error("{0}")]
    Forbidden(String),

    /// The request was understood but carries an illegal value or transition.
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}
