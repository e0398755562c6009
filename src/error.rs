/// Unified error types for the dating API
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying a short description of server-side failures
pub const APPLICATION_ERROR_HEADER: &str = "Application-Error";

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or invalid bearer token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Requester does not own the gallery, or the photo is not in it
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Operation would break a gallery invariant
    #[error("{0}")]
    InvalidState(String),

    /// Asset store did not confirm deletion of a remote asset
    #[error("Remote deletion failed: {0}")]
    RemoteDeletionFailure(String),

    /// Asset store rejected or did not complete an upload
    #[error("Upload failed: {0}")]
    UploadFailure(String),

    /// Staged changes could not be committed
    #[error("{0}")]
    PersistenceFailure(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Short machine-readable code used in error bodies and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "AuthenticationRequired",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::InvalidState(_) => "InvalidState",
            ApiError::RemoteDeletionFailure(_) => "RemoteDeletionFailure",
            ApiError::UploadFailure(_) => "UploadFailure",
            ApiError::PersistenceFailure(_) => "PersistenceFailure",
            ApiError::Validation(_) => "InvalidRequest",
            ApiError::NotFound(_) => "NotFound",
            ApiError::RateLimitExceeded { .. } => "RateLimitExceeded",
            ApiError::Database(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                "InternalServerError"
            }
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidState(_)
            | ApiError::PersistenceFailure(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RemoteDeletionFailure(_) | ApiError::UploadFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ApiError to HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string() // Don't leak details
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: message.clone(),
        });

        let mut response = (status, body).into_response();

        if status.is_server_error() {
            if let Ok(value) = HeaderValue::from_str(&message) {
                let headers = response.headers_mut();
                headers.insert(APPLICATION_ERROR_HEADER, value);
                headers.insert(
                    header::ACCESS_CONTROL_EXPOSE_HEADERS,
                    HeaderValue::from_static(APPLICATION_ERROR_HEADER),
                );
            }
        }

        if let ApiError::RateLimitExceeded { retry_after } = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
