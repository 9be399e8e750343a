//! Wire types for the HTTP API

use chrono::{DateTime, Utc};
use reviewer_core::{Member, PullRequest, PullRequestShort, Team, User};
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Reject an empty identifier before it reaches the core
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MemberDto {
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) is_active: bool,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self {
            user_id: member.id,
            username: member.username,
            is_active: member.is_active,
        }
    }
}

impl From<MemberDto> for Member {
    fn from(dto: MemberDto) -> Self {
        Member::new(dto.user_id, dto.username, dto.is_active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TeamDto {
    pub(crate) team_name: String,
    pub(crate) members: Vec<MemberDto>,
}

impl From<Team> for TeamDto {
    fn from(team: Team) -> Self {
        Self {
            team_name: team.name,
            members: team.members.into_iter().map(MemberDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeamResponse {
    pub(crate) team: TeamDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamQuery {
    pub(crate) team_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserDto {
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) team_name: String,
    pub(crate) is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            team_name: user.team_name,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetIsActiveRequest {
    pub(crate) user_id: String,
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserQuery {
    pub(crate) user_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PullRequestShortDto {
    pub(crate) pull_request_id: String,
    pub(crate) pull_request_name: String,
    pub(crate) author_id: String,
    pub(crate) status: String,
}

impl From<PullRequestShort> for PullRequestShortDto {
    fn from(pr: PullRequestShort) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserReviewsResponse {
    pub(crate) user_id: String,
    pub(crate) pull_requests: Vec<PullRequestShortDto>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PullRequestDto {
    pub(crate) pull_request_id: String,
    pub(crate) pull_request_name: String,
    pub(crate) author_id: String,
    pub(crate) status: String,
    pub(crate) assigned_reviewers: Vec<String>,
    pub(crate) need_more_reviewers: bool,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status.to_string(),
            assigned_reviewers: pr.reviewers,
            need_more_reviewers: pr.needs_more_reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PullRequestResponse {
    pub(crate) pr: PullRequestDto,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReassignResponse {
    pub(crate) pr: PullRequestDto,
    pub(crate) replaced_by: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePullRequestRequest {
    pub(crate) pull_request_id: String,
    pub(crate) pull_request_name: String,
    pub(crate) author_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MergePullRequestRequest {
    pub(crate) pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReassignRequest {
    pub(crate) pull_request_id: String,
    pub(crate) old_user_id: String,
}
