use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::constants::messages;
use crate::database::StoreError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for categorizing errors in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    InvalidFormat,
    NotFound,
    QueryFailed,
    InternalServerError,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 3001,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::NotFound => 4001,
            ErrorCode::QueryFailed => 7002,
            ErrorCode::InternalServerError => 9999,
        }
    }
}

/// Body of every error response: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Submitted data failed validation; the message is shown to the client verbatim
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn empty_item() -> Self {
        ApiError::Validation(messages::EMPTY_ITEM_ERROR.to_string())
    }

    pub fn duplicate_item() -> Self {
        ApiError::Validation(messages::DUPLICATE_ITEM_ERROR.to_string())
    }

    pub fn list_not_found() -> Self {
        ApiError::NotFound(messages::LIST_NOT_FOUND.to_string())
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::InvalidInput,
            ApiError::BadRequest(_) => ErrorCode::InvalidFormat,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Database(_) => ErrorCode::QueryFailed,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client; server errors are masked
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::BadRequest(msg) | ApiError::NotFound(msg) => {
                msg.clone()
            }
            ApiError::Database(_) | ApiError::Internal(_) => messages::INTERNAL_ERROR.to_string(),
        }
    }

    /// Logged inside the request span, which carries the request id
    fn log_error(&self) {
        let code = self.error_code();
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    code = code.code(),
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    code = code.code(),
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateItem => ApiError::duplicate_item(),
            StoreError::ListNotFound(_) => ApiError::list_not_found(),
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        match err {
            JsonRejection::JsonSyntaxError(_) => ApiError::BadRequest("Invalid JSON format".to_string()),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("JSON content type required".to_string())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(err: FormRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::list_not_found()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        self.log_error();

        let body = ErrorResponse {
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
