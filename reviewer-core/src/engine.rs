//! Reviewer assignment engine
//!
//! Orchestrates the [`TeamDirectory`], the [`PullRequestStore`] and the
//! [`ReviewerSelector`] to create pull requests, merge them and swap out
//! reviewers.
//!
//! The engine reads state, decides, and then asks the store for a single
//! conditional write. It never trusts its earlier read for correctness: the
//! store re-checks that the pull request is still open and that the old
//! reviewer is still linked as part of the write, so racing callers see
//! `PrMerged` or `ReviewerNotAssigned` instead of a lost update.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::config::AssignmentConfig;
use crate::directory::TeamDirectory;
use crate::domain::{PullRequest, PullRequestDraft, Reassignment};
use crate::selection::ReviewerSelector;
use crate::store::PullRequestStore;
use crate::{Error, Result};

/// Entry point for the create, merge and reassign use cases
pub struct AssignmentEngine {
    directory: Arc<dyn TeamDirectory>,
    store: Arc<dyn PullRequestStore>,
    selector: ReviewerSelector,
    policy: AssignmentConfig,
}

impl AssignmentEngine {
    /// Create an engine with an entropy-seeded selector
    pub fn new(
        directory: Arc<dyn TeamDirectory>,
        store: Arc<dyn PullRequestStore>,
        policy: AssignmentConfig,
    ) -> Self {
        Self {
            directory,
            store,
            selector: ReviewerSelector::from_entropy(),
            policy,
        }
    }

    /// Replace the source of randomness
    pub fn with_selector(mut self, selector: ReviewerSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Create a pull request and assign reviewers from the author's team.
    ///
    /// Not idempotent: a second call with the same ID fails with `PrExists`
    /// and leaves the first pull request untouched.
    #[instrument(skip(self, name), fields(op = "pull_request.create"))]
    pub async fn create_pull_request(
        &self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        self.with_deadline(self.create(pull_request_id, name, author_id))
            .await
    }

    /// Merge a pull request.
    ///
    /// Idempotent: merging an already merged pull request returns the stored
    /// snapshot, including the original `merged_at`, without writing.
    #[instrument(skip(self), fields(op = "pull_request.merge"))]
    pub async fn set_merged(&self, pull_request_id: &str) -> Result<PullRequest> {
        self.with_deadline(self.merge(pull_request_id)).await
    }

    /// Replace one reviewer with a random active teammate of the author.
    ///
    /// The replacement is never the author and never anyone already on the
    /// reviewer set, including the reviewer being replaced.
    #[instrument(skip(self), fields(op = "pull_request.reassign"))]
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        self.with_deadline(self.reassign(pull_request_id, old_reviewer_id))
            .await
    }

    async fn create(
        &self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        let author = self.directory.get_user(author_id).await?;
        let teammates = self.directory.get_active_members(author.team_id).await?;

        let reviewers = self
            .selector
            .select(&teammates, &author.id, self.policy.max_reviewers_per_pr);
        let needs_more_reviewers = reviewers.len() < self.policy.needs_more_reviewers_threshold;

        let draft = PullRequestDraft {
            id: pull_request_id.to_string(),
            name: name.to_string(),
            author_id: author.id,
            reviewers,
            needs_more_reviewers,
        };

        // A selected reviewer may vanish before the write: UserNotFound
        let pr = self.store.create(&draft).await?;

        info!(
            reviewers = ?pr.reviewers,
            needs_more_reviewers = pr.needs_more_reviewers,
            "Pull request created"
        );
        Ok(pr)
    }

    async fn merge(&self, pull_request_id: &str) -> Result<PullRequest> {
        let pr = self.store.get_by_id(pull_request_id).await?;
        if pr.is_merged() {
            debug!("Pull request already merged");
            return Ok(pr);
        }

        let pr = self.store.set_merged(pull_request_id).await?;
        info!(merged_at = ?pr.merged_at, "Pull request merged");
        Ok(pr)
    }

    async fn reassign(&self, pull_request_id: &str, old_reviewer_id: &str) -> Result<Reassignment> {
        let pr = self.store.get_by_id(pull_request_id).await?;

        if !pr.lifecycle().accepts_reassign() {
            return Err(Error::PrMerged(pull_request_id.to_string()));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(Error::ReviewerNotAssigned {
                pull_request_id: pull_request_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let author = self.directory.get_user(&pr.author_id).await?;
        let teammates = self.directory.get_active_members(author.team_id).await?;

        let pool: Vec<String> = teammates
            .into_iter()
            .map(|member| member.id)
            .filter(|id| *id != pr.author_id && !pr.has_reviewer(id))
            .collect();

        let replacement = self
            .selector
            .pick(&pool)
            .ok_or_else(|| Error::NoReviewerCandidates(pull_request_id.to_string()))?;

        // Re-checks status and the old link inside the write
        let updated = self
            .store
            .swap_reviewer(pull_request_id, old_reviewer_id, &replacement)
            .await?;

        info!(replaced_by = %replacement, "Reviewer reassigned");
        Ok(Reassignment {
            pull_request: updated,
            replaced_by: replacement,
        })
    }

    /// Run a use case under the configured deadline.
    ///
    /// On expiry the future is dropped, which rolls back any open
    /// transaction inside the store.
    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.policy.request_timeout;
        let result = match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::DeadlineExceeded(limit)),
        };

        if let Err(err) = &result {
            if err.is_expected() {
                debug!(kind = err.kind(), error = %err, "Request rejected");
            } else {
                error!(kind = err.kind(), error = ?err, "Request failed");
            }
        }

        result
    }
}
