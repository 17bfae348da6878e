//! Error types for the log server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_auth::AuthError;
use quill_logs::LogError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result type alias for request handling.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential or tenant check failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request body or parameters are invalid.
    #[error("{0}")]
    Validation(String),

    /// Wrong HTTP method for the endpoint.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The persistence backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else that went wrong while serving the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body.
    ///
    /// Storage and internal details stay in the server log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "failed to access log storage".to_string(),
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LogError> for ApiError {
    fn from(err: LogError) -> Self {
        if err.is_validation() {
            Self::Validation(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors that stop the server process.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Startup configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The log database could not be opened.
    #[error("failed to open log storage: {0}")]
    Storage(#[from] LogError),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use test_case::test_case;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test_case(ApiError::Auth(AuthError::MissingOrMalformedCredential), StatusCode::UNAUTHORIZED ; "malformed credential")]
    #[test_case(ApiError::Auth(AuthError::Unauthorized), StatusCode::UNAUTHORIZED ; "unauthorized")]
    #[test_case(ApiError::Auth(AuthError::MissingTenant), StatusCode::BAD_REQUEST ; "missing tenant")]
    #[test_case(ApiError::Validation("bad".to_string()), StatusCode::BAD_REQUEST ; "validation")]
    #[test_case(ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED ; "method")]
    #[test_case(ApiError::Storage("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR ; "storage")]
    #[test_case(ApiError::Internal("join".to_string()), StatusCode::INTERNAL_SERVER_ERROR ; "internal")]
    fn status_mapping(err: ApiError, expected: StatusCode) {
        assert_eq!(err.status(), expected);
    }

    #[tokio::test]
    async fn auth_error_body() {
        let (status, json) = body_json(ApiError::Auth(AuthError::MissingOrMalformedCredential)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "invalid or missing authorization header");
    }

    #[tokio::test]
    async fn storage_details_are_not_echoed() {
        let (status, json) =
            body_json(ApiError::Storage("no such table: log_data".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "failed to access log storage");
        assert!(!json.to_string().contains("log_data"));
    }

    #[test]
    fn log_errors_split_into_validation_and_storage() {
        let err = ApiError::from(LogError::InvalidTimestamp);
        assert!(matches!(err, ApiError::Validation(ref m) if m == "invalid timestamp"));

        let err = ApiError::from(LogError::TenantMismatch);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(LogError::Storage("locked".to_string()));
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::Config("TENANT_SECRET_KEYS is empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: TENANT_SECRET_KEYS is empty"
        );
    }
}
