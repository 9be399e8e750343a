//! SQLite-backed [`TeamDirectory`] and [`PullRequestStore`]

use async_trait::async_trait;
use reviewer_db::{
    CreatePullRequest, Database, MemberRow, NewMember, PullRequestRecord, PullRequestShortRow,
    TeamRecord, UserRow,
};

use crate::directory::TeamDirectory;
use crate::domain::{
    Member, PrStatus, PullRequest, PullRequestDraft, PullRequestShort, Team, User,
};
use crate::store::PullRequestStore;
use crate::Result;

/// Directory and store backed by a [`Database`]
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            username: row.username,
            team_id: row.team_id,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.user_id,
            username: row.username,
            is_active: row.is_active,
        }
    }
}

impl From<TeamRecord> for Team {
    fn from(record: TeamRecord) -> Self {
        Self {
            id: record.team_id,
            name: record.team_name,
            members: record.members.into_iter().map(Member::from).collect(),
        }
    }
}

impl TryFrom<PullRequestRecord> for PullRequest {
    type Error = crate::Error;

    fn try_from(record: PullRequestRecord) -> Result<Self> {
        Ok(Self {
            status: record.status.parse()?,
            id: record.pull_request_id,
            name: record.pull_request_name,
            author_id: record.author_id,
            reviewers: record.reviewers,
            needs_more_reviewers: record.need_more_reviewers,
            created_at: record.created_at,
            merged_at: record.merged_at,
        })
    }
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = crate::Error;

    fn try_from(row: PullRequestShortRow) -> Result<Self> {
        Ok(Self {
            status: row.status.parse::<PrStatus>()?,
            id: row.pull_request_id,
            name: row.pull_request_name,
            author_id: row.author_id,
        })
    }
}

#[async_trait]
impl TeamDirectory for SqliteBackend {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        Ok(self.db.users().get_by_id(user_id).await?.into())
    }

    async fn get_active_members(&self, team_id: i64) -> Result<Vec<Member>> {
        let rows = self.db.teams().list_active_members(team_id).await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn create_team(&self, team_name: &str, members: &[Member]) -> Result<Team> {
        let members: Vec<NewMember> = members
            .iter()
            .map(|m| NewMember {
                user_id: m.id.clone(),
                username: m.username.clone(),
                is_active: m.is_active,
            })
            .collect();

        Ok(self
            .db
            .teams()
            .create_with_members(team_name, &members)
            .await?
            .into())
    }

    async fn get_team(&self, team_name: &str) -> Result<Team> {
        Ok(self.db.teams().get_by_name(team_name).await?.into())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        Ok(self.db.users().set_is_active(user_id, is_active).await?.into())
    }
}

#[async_trait]
impl PullRequestStore for SqliteBackend {
    async fn create(&self, draft: &PullRequestDraft) -> Result<PullRequest> {
        let record = self
            .db
            .pull_requests()
            .create(&CreatePullRequest {
                pull_request_id: draft.id.clone(),
                pull_request_name: draft.name.clone(),
                author_id: draft.author_id.clone(),
                need_more_reviewers: draft.needs_more_reviewers,
                reviewers: draft.reviewers.clone(),
            })
            .await?;
        record.try_into()
    }

    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest> {
        self.db
            .pull_requests()
            .get_by_id(pull_request_id)
            .await?
            .try_into()
    }

    async fn set_merged(&self, pull_request_id: &str) -> Result<PullRequest> {
        self.db
            .pull_requests()
            .set_merged(pull_request_id)
            .await?
            .try_into()
    }

    async fn swap_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<PullRequest> {
        self.db
            .pull_requests()
            .swap_reviewer(pull_request_id, old_reviewer_id, new_reviewer_id)
            .await?
            .try_into()
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        self.db
            .pull_requests()
            .list_by_reviewer(user_id)
            .await?
            .into_iter()
            .map(PullRequestShort::try_from)
            .collect()
    }
}
