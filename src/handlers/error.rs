//! JSON error responses for the API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::content::{DictionaryError, TokenizerError};
use crate::db::DbLockError;
use crate::services::ServiceError;

/// Error returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Logged server-side; the client only sees a generic message
    Internal(String),
    /// A lock was poisoned by a panicking request
    Unavailable,
    /// An optional feature whose data files were not found at startup
    Unconfigured(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable | ApiError::Unconfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to API clients
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Unconfigured(msg) => msg,
            ApiError::Internal(_) => "Internal server error",
            ApiError::Unavailable => "Service temporarily unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Request failed: {}", detail);
        }

        (
            self.status(),
            Json(serde_json::json!({ "error": self.user_message() })),
        )
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(hash) => ApiError::NotFound(format!("Question not found: {}", hash)),
            ServiceError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<DictionaryError> for ApiError {
    fn from(e: DictionaryError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<TokenizerError> for ApiError {
    fn from(e: TokenizerError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<DbLockError> for ApiError {
    fn from(_: DbLockError) -> Self {
        ApiError::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        let cases = [
            (ServiceError::Invalid("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (
                ServiceError::Database(rusqlite::Error::QueryReturnedNoRows),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(ApiError::from(DbLockError).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from(DictionaryError::UnknownLanguage("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::Internal("disk I/O error at /var/data".into());
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_unconfigured_names_the_feature() {
        let err = ApiError::Unconfigured("Tokenizer dictionary not installed".into());
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.user_message(), "Tokenizer dictionary not installed");
    }
}
