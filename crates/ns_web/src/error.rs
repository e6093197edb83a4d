use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error("Internal server error")]
    Internal(String),
}

impl From<ns_core::Error> for ApiError {
    fn from(e: ns_core::Error) -> Self {
        use ns_core::Error;
        match e {
            Error::InvalidRequest(msg) | Error::Config(msg) | Error::InvalidUrl(msg) => {
                ApiError::BadRequest(msg)
            }
            Error::Invariant(msg) => ApiError::Internal(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(detail) => {
                tracing::error!("💥 {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let bad: ApiError = ns_core::Error::InvalidRequest("company name is empty".into()).into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = ns_core::Error::Invariant("3 articles but 2 outcomes".into()).into();
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let upstream: ApiError = ns_core::Error::FetchUnavailable("timeout".into()).into();
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
