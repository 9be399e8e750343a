use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use reviewer_core::Member;
use serde_json::{json, Value};

use super::dto::{
    require, CreatePullRequestRequest, MergePullRequestRequest, PullRequestResponse,
    PullRequestShortDto, ReassignRequest, ReassignResponse, SetIsActiveRequest, TeamDto,
    TeamQuery, TeamResponse, UserQuery, UserResponse, UserReviewsResponse,
};
use super::error::ApiError;
use super::AppState;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<TeamDto>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let Json(request) = payload?;
    require("team_name", &request.team_name)?;
    for member in &request.members {
        require("user_id", &member.user_id)?;
    }

    let members: Vec<Member> = request.members.into_iter().map(Member::from).collect();
    let team = state.teams.create_team(&request.team_name, &members).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamResponse { team: team.into() }),
    ))
}

pub(crate) async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<TeamDto>, ApiError> {
    let Query(query) = query?;
    require("team_name", &query.team_name)?;

    let team = state.teams.get_team(&query.team_name).await?;
    Ok(Json(team.into()))
}

pub(crate) async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    require("user_id", &request.user_id)?;

    let user = state
        .teams
        .set_user_active(&request.user_id, request.is_active)
        .await?;
    Ok(Json(UserResponse { user: user.into() }))
}

pub(crate) async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ApiError> {
    let Query(query) = query?;
    require("user_id", &query.user_id)?;

    let reviews = state.teams.reviews_for_user(&query.user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id: query.user_id,
        pull_requests: reviews.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}

pub(crate) async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiError> {
    let Json(request) = payload?;
    require("pull_request_id", &request.pull_request_id)?;
    require("pull_request_name", &request.pull_request_name)?;
    require("author_id", &request.author_id)?;

    let pr = state
        .engine
        .create_pull_request(
            &request.pull_request_id,
            &request.pull_request_name,
            &request.author_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse { pr: pr.into() }),
    ))
}

pub(crate) async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiError> {
    let Json(request) = payload?;
    require("pull_request_id", &request.pull_request_id)?;

    let pr = state.engine.set_merged(&request.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

pub(crate) async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiError> {
    let Json(request) = payload?;
    require("pull_request_id", &request.pull_request_id)?;
    require("old_user_id", &request.old_user_id)?;

    let outcome = state
        .engine
        .reassign_reviewer(&request.pull_request_id, &request.old_user_id)
        .await?;

    Ok(Json(ReassignResponse {
        pr: outcome.pull_request.into(),
        replaced_by: outcome.replaced_by,
    }))
}
