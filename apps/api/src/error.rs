//! Error types for the API.
//!
//! Every failure leaves the server as `{ "code": <status>, "message": <text> }`.
//!
//! ## Mapping
//! ```text
//! ┌──────────────────────────────┬────────────┬──────────────────────────┐
//! │ Source                       │ ErrorKind  │ Status                   │
//! ├──────────────────────────────┼────────────┼──────────────────────────┤
//! │ ValidationError, bad JSON    │ Validation │ 400                      │
//! │ missing/invalid/expired token│ Auth       │ 401                      │
//! │ token role is not admin      │ Forbidden  │ 403                      │
//! │ OfferNotFound, OrderNotFound │ NotFound   │ 400 (404 on GET order)   │
//! │ InsufficientStock, duplicate │ Conflict   │ 400                      │
//! │ store / hashing / signing    │ Internal   │ 500 (details logged only)│
//! └──────────────────────────────┴────────────┴──────────────────────────┘
//! ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use newworld_core::{CoreError, ValidationError};
use newworld_db::{DbError, OrderError};
use serde::Serialize;
use tracing::error;

/// Error category, independent of the status code it is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Status used unless the endpoint overrides it.
    pub fn default_status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error on its way to the client.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub message: String,
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            status: kind.default_status(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// A reference to something that does not exist, reported as 400.
    pub fn missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// The resource named by the URL does not exist, reported as 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::missing(message).with_status(StatusCode::NOT_FOUND)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Wire shape of every error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Don't expose internal error details to clients
        let message = if self.kind == ErrorKind::Internal {
            error!(error = %self.message, "Request failed");
            "internal server error".to_string()
        } else {
            self.message
        };

        let body = ErrorBody {
            code: self.status.as_u16(),
            message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OfferNotFound(_) | CoreError::OrderNotFound(_) => {
                ApiError::missing(err.to_string())
            }
            CoreError::InsufficientStock { .. } => ApiError::conflict(err.to_string()),
            CoreError::InvalidStatusTransition { .. }
            | CoreError::AmountOverflow { .. }
            | CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::missing(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict(err.to_string()),
            DbError::Validation(v) => v.into(),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Rejected(core) => core.into(),
            OrderError::Db(db) => db.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(get_status(ApiError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(ApiError::unauthorized("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(ApiError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(get_status(ApiError::missing("x")), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(ApiError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(get_status(ApiError::conflict("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(ApiError::internal("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stock_shortage_names_offer() {
        let err: ApiError = OrderError::Rejected(CoreError::InsufficientStock {
            offer_id: 1,
            available: 10,
            requested: 11,
        })
        .into();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("offer 1"));
    }

    #[test]
    fn test_store_failures_are_internal() {
        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.kind, ErrorKind::Internal);

        let err: ApiError = DbError::duplicate("users.email", "a@b.co").into();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
