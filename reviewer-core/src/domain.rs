//! Domain types: users, teams, pull requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A user together with the team it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub team_id: i64,
    pub team_name: String,
    pub is_active: bool,
}

/// Read model of a user as seen from its team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub username: String,
    pub is_active: bool,
}

impl Member {
    pub fn new(id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            is_active,
        }
    }
}

/// A team with all of its members, active or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub members: Vec<Member>,
}

/// Persisted status of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::internal(format!(
                "unknown pull request status {:?}",
                other
            ))),
        }
    }
}

/// Lifecycle state of a pull request.
///
/// Both open states accept a reviewer reassignment; `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    OpenUnassigned,
    OpenAssigned,
    Merged,
}

impl Lifecycle {
    /// Whether a reviewer may be swapped out in this state
    pub fn accepts_reassign(&self) -> bool {
        !matches!(self, Lifecycle::Merged)
    }
}

/// A pull request with its current reviewer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub reviewers: Vec<String>,
    pub needs_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewers.iter().any(|r| r == user_id)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.status {
            PrStatus::Merged => Lifecycle::Merged,
            PrStatus::Open if self.reviewers.is_empty() => Lifecycle::OpenUnassigned,
            PrStatus::Open => Lifecycle::OpenAssigned,
        }
    }

    /// Short listing form
    pub fn short(&self) -> PullRequestShort {
        PullRequestShort {
            id: self.id.clone(),
            name: self.name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// A pull request about to be persisted with its chosen reviewers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub reviewers: Vec<String>,
    pub needs_more_reviewers: bool,
}

/// Short listing form of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
}

/// Outcome of a successful reviewer reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}
