//! HTTP API over the assignment engine and team service

mod auth;
mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderName, Request};
use axum::routing::{get, post};
use axum::{middleware, Router};
use reviewer_core::{AdminGuard, AssignmentEngine, TeamService};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

/// Header carrying the per-request correlation ID
pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AssignmentEngine>,
    pub teams: Arc<TeamService>,
    pub admin: AdminGuard,
}

/// Build the router.
///
/// Everything except `/health` lives under `/api/v1`. Mutating pull request
/// and user routes require the admin token header. Every request gets an
/// `x-request-id` (kept if the caller sent one) that is echoed in the response
/// and recorded on the request span.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/users/setIsActive", post(routes::set_is_active))
        .route("/pullRequest/create", post(routes::create_pull_request))
        .route("/pullRequest/merge", post(routes::merge_pull_request))
        .route("/pullRequest/reassign", post(routes::reassign_reviewer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let api = Router::new()
        .route("/team/add", post(routes::add_team))
        .route("/team/get", get(routes::get_team))
        .route("/users/getReview", get(routes::get_review))
        .merge(admin_routes);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_span)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                ))),
        )
        .with_state(state)
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id,
        client_ip,
    )
}
