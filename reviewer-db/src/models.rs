//! Row types and write models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored status of an open pull request
pub const STATUS_OPEN: &str = "OPEN";
/// Stored status of a merged pull request
pub const STATUS_MERGED: &str = "MERGED";

/// Team row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamRow {
    pub team_id: i64,
    pub team_name: String,
}

/// Team member as stored in `users`, without the team reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberRow {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// Team together with all of its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: i64,
    pub team_name: String,
    pub members: Vec<MemberRow>,
}

/// Member to insert or update while creating a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// User joined with the name of its team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_id: i64,
    pub team_name: String,
    pub is_active: bool,
}

/// Pull request row without reviewer links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub need_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    /// Whether the row is in the terminal merged state
    pub fn is_merged(&self) -> bool {
        self.status == STATUS_MERGED
    }

    /// Attach the reviewer links read alongside this row
    pub fn with_reviewers(self, reviewers: Vec<String>) -> PullRequestRecord {
        PullRequestRecord {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: self.status,
            need_more_reviewers: self.need_more_reviewers,
            created_at: self.created_at,
            merged_at: self.merged_at,
            reviewers,
        }
    }
}

/// Pull request with its current reviewer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub need_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub reviewers: Vec<String>,
}

/// Short listing form of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequestShortRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

/// Pull request to create together with its chosen reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub need_more_reviewers: bool,
    pub reviewers: Vec<String>,
}
