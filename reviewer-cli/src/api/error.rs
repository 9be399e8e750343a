//! Error responses: `{"error": {"code": ..., "message": ...}}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reviewer_core::Error;
use serde_json::json;

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "missing or invalid admin token",
        )
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> &'static str {
        self.code
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::TeamExists(_) => Self::new(StatusCode::CONFLICT, "TEAM_EXISTS", message),
            Error::PrExists(_) => Self::new(StatusCode::CONFLICT, "PR_EXISTS", message),
            Error::PrMerged(_) => Self::new(StatusCode::CONFLICT, "PR_MERGED", message),
            Error::ReviewerNotAssigned { .. } => {
                Self::new(StatusCode::CONFLICT, "NOT_ASSIGNED", message)
            }
            Error::NoReviewerCandidates(_) => {
                Self::new(StatusCode::CONFLICT, "NO_CANDIDATE", message)
            }
            Error::UserNotFound(_) | Error::TeamNotFound(_) | Error::PrNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            }
            Error::Validation(_) => Self::bad_request(message),
            Error::DeadlineExceeded(_) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED", message)
            }
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                tracing::error!(error = ?err, "Unhandled error while serving request");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::TeamExists("t".into()), StatusCode::CONFLICT, "TEAM_EXISTS"),
            (Error::PrMerged("p".into()), StatusCode::CONFLICT, "PR_MERGED"),
            (Error::UserNotFound("u".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                Error::NoReviewerCandidates("p".into()),
                StatusCode::CONFLICT,
                "NO_CANDIDATE",
            ),
            (
                Error::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let api = ApiError::from(Error::internal(std::io::Error::other(
            "connection refused to 10.0.0.7:5432",
        )));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code(), "INTERNAL_ERROR");
        assert!(!api.message.contains("10.0.0.7"));
    }
}
