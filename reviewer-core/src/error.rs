//! Error types for reviewer assignment

use std::time::Duration;

use thiserror::Error;

/// Result type alias for reviewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause of an unexpected failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for reviewer operations
///
/// Every variant except [`Error::Config`], [`Error::Io`] and
/// [`Error::Internal`] is an expected outcome that callers map to a
/// meaningful response. `Internal` renders without its cause; the cause is
/// available through `source()` for logging.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced user does not exist
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Referenced team does not exist
    #[error("team not found: {0}")]
    TeamNotFound(String),

    /// Team name is already taken
    #[error("team already exists: {0}")]
    TeamExists(String),

    /// Referenced pull request does not exist
    #[error("pull request not found: {0}")]
    PrNotFound(String),

    /// Pull request ID is already taken
    #[error("pull request already exists: {0}")]
    PrExists(String),

    /// Mutating action attempted on a merged pull request
    #[error("pull request already merged: {0}")]
    PrMerged(String),

    /// The reviewer to replace is not currently assigned
    #[error("reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        pull_request_id: String,
        reviewer_id: String,
    },

    /// No active teammate is eligible as a replacement
    #[error("no replacement candidate for pull request {0}")]
    NoReviewerCandidates(String),

    /// Input that should have been rejected at the boundary
    #[error("invalid input: {0}")]
    Validation(String),

    /// The call did not finish before its deadline
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure (storage unavailable, aborted transaction, ...)
    #[error("internal error")]
    Internal(#[source] BoxError),
}

impl Error {
    /// Wrap an unexpected failure
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Error::Internal(err.into())
    }

    /// Whether this is an expected, caller-recoverable outcome.
    ///
    /// An expired deadline points at slow or unavailable storage and is
    /// treated like any other infrastructure failure.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Error::DeadlineExceeded(_) | Error::Config(_) | Error::Io(_) | Error::Internal(_)
        )
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UserNotFound(_) => "user_not_found",
            Error::TeamNotFound(_) => "team_not_found",
            Error::TeamExists(_) => "team_exists",
            Error::PrNotFound(_) => "pr_not_found",
            Error::PrExists(_) => "pr_exists",
            Error::PrMerged(_) => "pr_merged",
            Error::ReviewerNotAssigned { .. } => "reviewer_not_assigned",
            Error::NoReviewerCandidates(_) => "no_reviewer_candidates",
            Error::Validation(_) => "validation",
            Error::DeadlineExceeded(_) => "deadline_exceeded",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Internal(_) => "internal",
        }
    }
}

#[cfg(feature = "database")]
impl From<reviewer_db::DbError> for Error {
    fn from(value: reviewer_db::DbError) -> Self {
        use reviewer_db::DbError;

        match value {
            DbError::TeamExists(name) => Error::TeamExists(name),
            DbError::TeamNotFound(name) => Error::TeamNotFound(name),
            DbError::UserNotFound(id) => Error::UserNotFound(id),
            DbError::PrExists(id) => Error::PrExists(id),
            DbError::PrNotFound(id) => Error::PrNotFound(id),
            DbError::PrMerged(id) => Error::PrMerged(id),
            DbError::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            } => Error::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            },
            other => Error::internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_internal_error_hides_cause() {
        let err = Error::internal(std::io::Error::other("disk on fire at /var/db"));
        assert_eq!(err.to_string(), "internal error");
        assert!(err.source().is_some());
        assert!(!err.is_expected());
    }

    #[test]
    fn test_expected_kinds() {
        assert!(Error::PrMerged("pr-1".into()).is_expected());
        assert!(Error::NoReviewerCandidates("pr-1".into()).is_expected());
        assert_eq!(
            Error::ReviewerNotAssigned {
                pull_request_id: "pr-1".into(),
                reviewer_id: "u2".into(),
            }
            .kind(),
            "reviewer_not_assigned"
        );
        assert!(!Error::Config("bad".into()).is_expected());
        assert!(!Error::DeadlineExceeded(Duration::from_millis(5)).is_expected());
    }
}
