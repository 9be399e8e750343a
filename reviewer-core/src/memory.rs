//! In-memory implementation of [`TeamDirectory`] and [`PullRequestStore`].
//!
//! All state lives behind a single `RwLock`, so every operation is atomic
//! with respect to every other one. State is lost on restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::directory::TeamDirectory;
use crate::domain::{
    Member, PrStatus, PullRequest, PullRequestDraft, PullRequestShort, Team, User,
};
use crate::store::PullRequestStore;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    team_id: i64,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct StoredPullRequest {
    /// Insertion sequence, used to list newest first
    seq: u64,
    pull_request: PullRequest,
}

#[derive(Debug, Default)]
struct State {
    next_team_id: i64,
    next_seq: u64,
    teams: BTreeMap<i64, String>,
    users: BTreeMap<String, StoredUser>,
    pull_requests: HashMap<String, StoredPullRequest>,
}

impl State {
    fn user(&self, user_id: &str) -> Result<User> {
        let stored = self
            .users
            .get(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        let team_name = self.teams.get(&stored.team_id).ok_or_else(|| {
            Error::internal(format!("user {} references a missing team", user_id))
        })?;

        Ok(User {
            id: user_id.to_string(),
            username: stored.username.clone(),
            team_id: stored.team_id,
            team_name: team_name.clone(),
            is_active: stored.is_active,
        })
    }

    fn members(&self, team_id: i64, only_active: bool) -> Vec<Member> {
        self.users
            .iter()
            .filter(|(_, u)| u.team_id == team_id && (u.is_active || !only_active))
            .map(|(id, u)| Member::new(id.clone(), u.username.clone(), u.is_active))
            .collect()
    }

    fn team_id_by_name(&self, team_name: &str) -> Option<i64> {
        self.teams
            .iter()
            .find(|(_, name)| name.as_str() == team_name)
            .map(|(id, _)| *id)
    }
}

/// In-memory team directory and pull request store
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamDirectory for InMemoryBackend {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.state.read().await.user(user_id)
    }

    async fn get_active_members(&self, team_id: i64) -> Result<Vec<Member>> {
        Ok(self.state.read().await.members(team_id, true))
    }

    async fn create_team(&self, team_name: &str, members: &[Member]) -> Result<Team> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if state.team_id_by_name(team_name).is_some() {
            return Err(Error::TeamExists(team_name.to_string()));
        }

        state.next_team_id += 1;
        let team_id = state.next_team_id;
        state.teams.insert(team_id, team_name.to_string());

        for member in members {
            state.users.insert(
                member.id.clone(),
                StoredUser {
                    username: member.username.clone(),
                    team_id,
                    is_active: member.is_active,
                },
            );
        }

        Ok(Team {
            id: team_id,
            name: team_name.to_string(),
            members: state.members(team_id, false),
        })
    }

    async fn get_team(&self, team_name: &str) -> Result<Team> {
        let state = self.state.read().await;
        let team_id = state
            .team_id_by_name(team_name)
            .ok_or_else(|| Error::TeamNotFound(team_name.to_string()))?;

        Ok(Team {
            id: team_id,
            name: team_name.to_string(),
            members: state.members(team_id, false),
        })
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        stored.is_active = is_active;
        state.user(user_id)
    }
}

#[async_trait]
impl PullRequestStore for InMemoryBackend {
    async fn create(&self, draft: &PullRequestDraft) -> Result<PullRequest> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if state.pull_requests.contains_key(&draft.id) {
            return Err(Error::PrExists(draft.id.clone()));
        }

        for user_id in std::iter::once(&draft.author_id).chain(&draft.reviewers) {
            if !state.users.contains_key(user_id) {
                return Err(Error::UserNotFound(user_id.clone()));
            }
        }

        let mut reviewers: Vec<String> = Vec::with_capacity(draft.reviewers.len());
        for reviewer in &draft.reviewers {
            if reviewers.contains(reviewer) {
                return Err(Error::Validation(format!(
                    "reviewer {} listed twice for pull request {}",
                    reviewer, draft.id
                )));
            }
            reviewers.push(reviewer.clone());
        }

        let pull_request = PullRequest {
            id: draft.id.clone(),
            name: draft.name.clone(),
            author_id: draft.author_id.clone(),
            status: PrStatus::Open,
            reviewers,
            needs_more_reviewers: draft.needs_more_reviewers,
            created_at: Utc::now(),
            merged_at: None,
        };

        state.next_seq += 1;
        state.pull_requests.insert(
            draft.id.clone(),
            StoredPullRequest {
                seq: state.next_seq,
                pull_request: pull_request.clone(),
            },
        );

        Ok(pull_request)
    }

    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest> {
        self.state
            .read()
            .await
            .pull_requests
            .get(pull_request_id)
            .map(|stored| stored.pull_request.clone())
            .ok_or_else(|| Error::PrNotFound(pull_request_id.to_string()))
    }

    async fn set_merged(&self, pull_request_id: &str) -> Result<PullRequest> {
        let mut state = self.state.write().await;
        let stored = state
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| Error::PrNotFound(pull_request_id.to_string()))?;

        let pr = &mut stored.pull_request;
        if pr.status == PrStatus::Open {
            pr.status = PrStatus::Merged;
            pr.merged_at = Some(Utc::now());
        }

        Ok(pr.clone())
    }

    async fn swap_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<PullRequest> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let pr = state
            .pull_requests
            .get_mut(pull_request_id)
            .map(|stored| &mut stored.pull_request)
            .ok_or_else(|| Error::PrNotFound(pull_request_id.to_string()))?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pull_request_id.to_string()));
        }

        let position = pr
            .reviewers
            .iter()
            .position(|r| r == old_reviewer_id)
            .ok_or_else(|| Error::ReviewerNotAssigned {
                pull_request_id: pull_request_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            })?;

        if !state.users.contains_key(new_reviewer_id) {
            return Err(Error::UserNotFound(new_reviewer_id.to_string()));
        }

        if pr.has_reviewer(new_reviewer_id) {
            return Err(Error::internal(format!(
                "reviewer {} is already assigned to pull request {}",
                new_reviewer_id, pull_request_id
            )));
        }

        pr.reviewers.remove(position);
        pr.reviewers.push(new_reviewer_id.to_string());

        Ok(pr.clone())
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;

        let mut matching: Vec<&StoredPullRequest> = state
            .pull_requests
            .values()
            .filter(|stored| stored.pull_request.has_reviewer(user_id))
            .collect();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(matching
            .into_iter()
            .map(|stored| stored.pull_request.short())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn backend_with_team() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend
            .create_team(
                "backend",
                &[
                    Member::new("u1", "alice", true),
                    Member::new("u2", "bob", true),
                    Member::new("u3", "carol", false),
                ],
            )
            .await
            .unwrap();
        backend
    }

    fn draft(id: &str, reviewers: &[&str]) -> PullRequestDraft {
        PullRequestDraft {
            id: id.to_string(),
            name: format!("change {}", id),
            author_id: "u1".to_string(),
            reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
            needs_more_reviewers: reviewers.is_empty(),
        }
    }

    #[tokio::test]
    async fn test_team_directory() {
        let backend = backend_with_team().await;

        let user = backend.get_user("u2").await.unwrap();
        assert_eq!(user.team_name, "backend");

        let active = backend.get_active_members(user.team_id).await.unwrap();
        let ids: Vec<_> = active.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(backend.get_active_members(999).await.unwrap().is_empty());

        let team = backend.get_team("backend").await.unwrap();
        assert_eq!(team.members.len(), 3);

        assert!(matches!(
            backend.create_team("backend", &[]).await,
            Err(Error::TeamExists(_))
        ));
        assert!(matches!(
            backend.get_team("frontend").await,
            Err(Error::TeamNotFound(_))
        ));
        assert!(matches!(
            backend.get_user("").await,
            Err(Error::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_user_active() {
        let backend = backend_with_team().await;

        let user = backend.set_user_active("u3", true).await.unwrap();
        assert!(user.is_active);
        assert_eq!(
            backend.get_active_members(user.team_id).await.unwrap().len(),
            3
        );
        assert!(matches!(
            backend.set_user_active("ghost", true).await,
            Err(Error::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_unknown_users() {
        let backend = backend_with_team().await;

        backend.create(&draft("pr-1", &["u2"])).await.unwrap();
        assert!(matches!(
            backend.create(&draft("pr-1", &[])).await,
            Err(Error::PrExists(_))
        ));
        assert_eq!(
            backend.get_by_id("pr-1").await.unwrap().reviewers,
            vec!["u2"]
        );

        assert!(matches!(
            backend.create(&draft("pr-2", &["u2", "ghost"])).await,
            Err(Error::UserNotFound(id)) if id == "ghost"
        ));
        assert!(matches!(
            backend.get_by_id("pr-2").await,
            Err(Error::PrNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_merged_stamps_once() {
        let backend = backend_with_team().await;
        backend.create(&draft("pr-1", &["u2"])).await.unwrap();

        let first = backend.set_merged("pr-1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        assert!(first.merged_at.is_some());

        let second = backend.set_merged("pr-1").await.unwrap();
        assert_eq!(first, second);

        assert!(matches!(
            backend.set_merged("missing").await,
            Err(Error::PrNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_swap_reviewer() {
        let backend = backend_with_team().await;
        backend.create(&draft("pr-1", &["u2"])).await.unwrap();
        backend.set_user_active("u3", true).await.unwrap();

        let pr = backend.swap_reviewer("pr-1", "u2", "u3").await.unwrap();
        assert_eq!(pr.reviewers, vec!["u3"]);

        assert!(matches!(
            backend.swap_reviewer("pr-1", "u2", "u3").await,
            Err(Error::ReviewerNotAssigned { reviewer_id, .. }) if reviewer_id == "u2"
        ));
        assert!(matches!(
            backend.swap_reviewer("pr-1", "u3", "ghost").await,
            Err(Error::UserNotFound(_))
        ));
        assert_eq!(backend.get_by_id("pr-1").await.unwrap().reviewers, vec!["u3"]);

        backend.set_merged("pr-1").await.unwrap();
        assert!(matches!(
            backend.swap_reviewer("pr-1", "u3", "u2").await,
            Err(Error::PrMerged(_))
        ));
        assert!(matches!(
            backend.swap_reviewer("nope", "u3", "u2").await,
            Err(Error::PrNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_reviewer_newest_first() {
        let backend = backend_with_team().await;
        backend.create(&draft("pr-1", &["u2"])).await.unwrap();
        backend.create(&draft("pr-2", &[])).await.unwrap();
        backend.create(&draft("pr-3", &["u2"])).await.unwrap();

        let listed = backend.list_by_reviewer("u2").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|pr| pr.id.as_str()).collect();
        assert_eq!(ids, vec!["pr-3", "pr-1"]);
        assert!(backend.list_by_reviewer("u1").await.unwrap().is_empty());
    }
}
