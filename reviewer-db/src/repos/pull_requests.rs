//! Pull request repository
//!
//! Every write runs in a single transaction and reads back the pull request
//! (row and reviewer links) inside that same transaction, so callers never see
//! a reviewer list older than the write they just made.
//!
//! State checks that guard a write are part of the write itself: merging only
//! updates rows that are still open, and a reviewer swap only deletes the old
//! link while the pull request is open. When such a statement affects no rows
//! the reason is looked up inside the transaction before reporting an error.

use crate::error::{is_foreign_key_violation, DbError, Result};
use crate::models::{
    CreatePullRequest, PullRequestRecord, PullRequestRow, PullRequestShortRow, STATUS_MERGED,
    STATUS_OPEN,
};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Repository for pull requests and their reviewer links
pub struct PullRequestRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PullRequestRepository<'a> {
    /// Create a new pull request repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pull request together with its reviewer links.
    ///
    /// Fails with [`DbError::PrExists`] on an ID collision and with
    /// [`DbError::UserNotFound`] if the author or any reviewer is unknown;
    /// in both cases nothing is persisted.
    pub async fn create(&self, pr: &CreatePullRequest) -> Result<PullRequestRecord> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id,
                status, need_more_reviewers, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (pull_request_id) DO NOTHING
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(STATUS_OPEN)
        .bind(pr.need_more_reviewers)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DbError::UserNotFound(pr.author_id.clone())
            } else {
                e.into()
            }
        })?;

        if inserted.rows_affected() == 0 {
            return Err(DbError::PrExists(pr.pull_request_id.clone()));
        }

        for reviewer_id in &pr.reviewers {
            Self::link_reviewer(&mut tx, &pr.pull_request_id, reviewer_id).await?;
        }

        let record = Self::load(&mut tx, &pr.pull_request_id).await?;
        tx.commit().await?;

        tracing::debug!(
            pull_request_id = %record.pull_request_id,
            reviewers = record.reviewers.len(),
            "Pull request stored"
        );

        Ok(record)
    }

    /// Get a pull request with its current reviewers
    pub async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequestRecord> {
        let mut tx = self.pool.begin().await?;
        let record = Self::load(&mut tx, pull_request_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Mark a pull request as merged.
    ///
    /// Only an open pull request is updated, so `merged_at` is stamped once.
    /// An already merged pull request is returned as stored.
    pub async fn set_merged(&self, pull_request_id: &str) -> Result<PullRequestRecord> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = ?, merged_at = ?
            WHERE pull_request_id = ? AND status = ?
            "#,
        )
        .bind(STATUS_MERGED)
        .bind(Utc::now())
        .bind(pull_request_id)
        .bind(STATUS_OPEN)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Either missing (error) or merged concurrently (keep the stored stamp)
            Self::fetch_row(&mut tx, pull_request_id).await?;
            tracing::debug!(%pull_request_id, "Pull request was already merged");
        }

        let record = Self::load(&mut tx, pull_request_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Replace one reviewer link with another.
    ///
    /// The old link is removed only while the pull request is open. If nothing
    /// was removed the whole operation fails and no new link is inserted.
    pub async fn swap_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<PullRequestRecord> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM pull_request_reviewers
            WHERE pull_request_id = ?
              AND reviewer_id = ?
              AND EXISTS (
                  SELECT 1 FROM pull_requests
                  WHERE pull_request_id = ? AND status = ?
              )
            "#,
        )
        .bind(pull_request_id)
        .bind(old_reviewer_id)
        .bind(pull_request_id)
        .bind(STATUS_OPEN)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            let row = Self::fetch_row(&mut tx, pull_request_id).await?;
            if row.is_merged() {
                return Err(DbError::PrMerged(pull_request_id.to_string()));
            }
            return Err(DbError::ReviewerNotAssigned {
                pull_request_id: pull_request_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        Self::link_reviewer(&mut tx, pull_request_id, new_reviewer_id).await?;

        let record = Self::load(&mut tx, pull_request_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// List pull requests on which the user is currently a reviewer
    pub async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShortRow>> {
        sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            INNER JOIN pull_request_reviewers r ON r.pull_request_id = p.pull_request_id
            WHERE r.reviewer_id = ?
            ORDER BY p.created_at DESC, p.pull_request_id
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(self.pool)
        .await
        .map_err(Into::into)
    }

    async fn link_reviewer(
        tx: &mut Transaction<'_, Sqlite>,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> Result<()> {
        let known: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = ?)")
                .bind(reviewer_id)
                .fetch_one(&mut **tx)
                .await?;
        if !known {
            return Err(DbError::UserNotFound(reviewer_id.to_string()));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id)
            VALUES (?, ?)
            ON CONFLICT (pull_request_id, reviewer_id) DO NOTHING
            "#,
        )
        .bind(pull_request_id)
        .bind(reviewer_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DbError::UserNotFound(reviewer_id.to_string())
            } else {
                e.into()
            }
        })?;

        if inserted.rows_affected() == 0 {
            return Err(DbError::InvalidData(format!(
                "reviewer {} is already assigned to {}",
                reviewer_id, pull_request_id
            )));
        }

        Ok(())
    }

    async fn fetch_row(
        tx: &mut Transaction<'_, Sqlite>,
        pull_request_id: &str,
    ) -> Result<PullRequestRow> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status,
                   need_more_reviewers, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DbError::PrNotFound(pull_request_id.to_string()))?;

        if row.status != STATUS_OPEN && row.status != STATUS_MERGED {
            return Err(DbError::InvalidData(format!(
                "pull request {} has unknown status {}",
                pull_request_id, row.status
            )));
        }

        Ok(row)
    }

    async fn load(
        tx: &mut Transaction<'_, Sqlite>,
        pull_request_id: &str,
    ) -> Result<PullRequestRecord> {
        let row = Self::fetch_row(tx, pull_request_id).await?;

        let reviewers: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT reviewer_id FROM pull_request_reviewers
            WHERE pull_request_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(pull_request_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(row.with_reviewers(reviewers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DatabaseConfig};
    use crate::models::NewMember;
    use std::collections::HashSet;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(temp_dir.path().join("test.db"));
        let db = Database::connect(config).await.unwrap();
        db.migrate().await.unwrap();

        let members: Vec<NewMember> = ["u1", "u2", "u3", "u4", "u5"]
            .iter()
            .map(|id| NewMember {
                user_id: id.to_string(),
                username: format!("user-{}", id),
                is_active: true,
            })
            .collect();
        db.teams()
            .create_with_members("backend", &members)
            .await
            .unwrap();

        (db, temp_dir)
    }

    fn draft(id: &str, reviewers: &[&str]) -> CreatePullRequest {
        CreatePullRequest {
            pull_request_id: id.to_string(),
            pull_request_name: format!("Change {}", id),
            author_id: "u1".to_string(),
            need_more_reviewers: reviewers.is_empty(),
            reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        let created = repo.create(&draft("pr-1", &["u2", "u3"])).await.unwrap();
        assert_eq!(created.status, STATUS_OPEN);
        assert_eq!(created.reviewers, vec!["u2", "u3"]);
        assert!(created.merged_at.is_none());

        let fetched = repo.get_by_id("pr-1").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_duplicate_create_keeps_first_reviewers() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        repo.create(&draft("pr-1", &["u2", "u3"])).await.unwrap();
        let err = repo.create(&draft("pr-1", &["u4"])).await.unwrap_err();
        assert!(matches!(err, DbError::PrExists(id) if id == "pr-1"));

        let fetched = repo.get_by_id("pr-1").await.unwrap();
        assert_eq!(fetched.reviewers, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn test_unknown_reviewer_rolls_back_create() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        let err = repo.create(&draft("pr-1", &["u2", "ghost"])).await.unwrap_err();
        assert!(matches!(err, DbError::UserNotFound(id) if id == "ghost"));

        assert!(matches!(
            repo.get_by_id("pr-1").await,
            Err(DbError::PrNotFound(_))
        ));
        assert!(repo.list_by_reviewer("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_author() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        let mut pr = draft("pr-1", &[]);
        pr.author_id = "ghost".to_string();
        assert!(matches!(
            repo.create(&pr).await,
            Err(DbError::UserNotFound(id)) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_set_merged_stamps_once() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());
        repo.create(&draft("pr-1", &["u2"])).await.unwrap();

        let merged = repo.set_merged("pr-1").await.unwrap();
        assert_eq!(merged.status, STATUS_MERGED);
        assert_eq!(merged.reviewers, vec!["u2"]);
        let stamp = merged.merged_at.expect("merged_at set");

        let again = repo.set_merged("pr-1").await.unwrap();
        assert_eq!(again.merged_at, Some(stamp));
        assert_eq!(again, merged);
    }

    #[tokio::test]
    async fn test_set_merged_missing() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        assert!(matches!(
            repo.set_merged("nope").await,
            Err(DbError::PrNotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_swap_reviewer() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());
        repo.create(&draft("pr-1", &["u2", "u3"])).await.unwrap();

        let swapped = repo.swap_reviewer("pr-1", "u2", "u4").await.unwrap();
        let reviewers: HashSet<_> = swapped.reviewers.iter().map(String::as_str).collect();
        assert_eq!(reviewers, HashSet::from(["u3", "u4"]));

        let listed = repo.list_by_reviewer("u4").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pull_request_id, "pr-1");
        assert!(repo.list_by_reviewer("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_swap_unassigned_reviewer_inserts_nothing() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());
        repo.create(&draft("pr-1", &["u2"])).await.unwrap();

        let err = repo.swap_reviewer("pr-1", "u3", "u4").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::ReviewerNotAssigned { ref reviewer_id, .. } if reviewer_id == "u3"
        ));
        assert_eq!(repo.get_by_id("pr-1").await.unwrap().reviewers, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_swap_on_merged_pull_request_is_rejected() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());
        repo.create(&draft("pr-1", &["u2"])).await.unwrap();
        repo.set_merged("pr-1").await.unwrap();

        let err = repo.swap_reviewer("pr-1", "u2", "u3").await.unwrap_err();
        assert!(matches!(err, DbError::PrMerged(_)));
        assert_eq!(repo.get_by_id("pr-1").await.unwrap().reviewers, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_swap_to_unknown_user_rolls_back_delete() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());
        repo.create(&draft("pr-1", &["u2"])).await.unwrap();

        let err = repo.swap_reviewer("pr-1", "u2", "ghost").await.unwrap_err();
        assert!(matches!(err, DbError::UserNotFound(_)));
        assert_eq!(repo.get_by_id("pr-1").await.unwrap().reviewers, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_swap_missing_pull_request() {
        let (db, _temp) = setup_test_db().await;
        let repo = PullRequestRepository::new(db.pool());

        assert!(matches!(
            repo.swap_reviewer("nope", "u2", "u3").await,
            Err(DbError::PrNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_swaps_of_same_reviewer() {
        let (db, _temp) = setup_test_db().await;
        db.pull_requests()
            .create(&draft("pr-1", &["u2", "u3"]))
            .await
            .unwrap();

        let first = db.clone();
        let second = db.clone();
        let (a, b) = tokio::join!(
            async move { first.pull_requests().swap_reviewer("pr-1", "u2", "u4").await },
            async move { second.pull_requests().swap_reviewer("pr-1", "u2", "u5").await },
        );

        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let not_assigned = outcomes
            .iter()
            .filter(|r| matches!(r, Err(DbError::ReviewerNotAssigned { .. })))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(not_assigned, 1);

        let reviewers = db.pull_requests().get_by_id("pr-1").await.unwrap().reviewers;
        assert_eq!(reviewers.len(), 2);
        assert!(!reviewers.contains(&"u2".to_string()));
    }
}
