//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A team with this name already exists
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// Team not found
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A pull request with this ID already exists
    #[error("Pull request already exists: {0}")]
    PrExists(String),

    /// Pull request not found
    #[error("Pull request not found: {0}")]
    PrNotFound(String),

    /// Pull request is merged and can no longer change reviewers
    #[error("Pull request already merged: {0}")]
    PrMerged(String),

    /// The reviewer is not linked to the pull request
    #[error("Reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        pull_request_id: String,
        reviewer_id: String,
    },
}

/// Whether a SQLx error came from a foreign key constraint
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;
