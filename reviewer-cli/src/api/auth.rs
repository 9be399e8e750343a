//! Admin token check for mutating routes

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::AppState;

/// Header carrying the shared admin secret
pub(crate) const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub(crate) async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.admin.verify_admin_token(presented) {
        tracing::warn!(path = %request.uri().path(), "Rejected request without a valid admin token");
        return ApiError::unauthorized().into_response();
    }

    next.run(request).await
}
