//! Pull request persistence
//!
//! Every operation is a single atomic unit of work. Writes that depend on
//! the pull request being open re-check that condition as part of the
//! write itself, so a decision made on an earlier read can never be applied
//! to a merged pull request.

use async_trait::async_trait;

use crate::domain::{PullRequest, PullRequestDraft, PullRequestShort};
use crate::Result;

/// Store that exclusively owns persisted pull request state
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Persist a pull request and its reviewer links together.
    ///
    /// Fails with `PrExists` on an ID collision and with `UserNotFound` if any
    /// reviewer is unknown; nothing is written in either case.
    async fn create(&self, draft: &PullRequestDraft) -> Result<PullRequest>;

    /// Current state and reviewer set; fails with `PrNotFound` if absent
    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest>;

    /// Move an open pull request to merged and stamp `merged_at`.
    ///
    /// Guarded by status: a pull request that is already merged is returned
    /// as stored and `merged_at` is never rewritten. Fails with `PrNotFound`
    /// if absent.
    async fn set_merged(&self, pull_request_id: &str) -> Result<PullRequest>;

    /// Replace `old_reviewer_id` with `new_reviewer_id` on an open pull request.
    ///
    /// Fails with `PrMerged` if the pull request was merged, with
    /// `ReviewerNotAssigned` if the old link is gone, and with `UserNotFound`
    /// if the new reviewer does not exist. Nothing changes on failure.
    async fn swap_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<PullRequest>;

    /// Pull requests on which the user is currently a reviewer, newest first
    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>>;
}
