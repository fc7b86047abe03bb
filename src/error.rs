use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    credentials::CredentialError, repository::RepositoryError, storage::StorageError,
    validation::ValidationIssue,
};

/// ApiError
///
/// The typed outcome of every failed operation. Services return it, and the HTTP
/// boundary turns it into `{success: false, error, details?}` with the matching
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<ValidationIssue>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The detail is logged when the response is built and never sent to the caller.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

/// ErrorBody
///
/// Wire shape of every error response. Error responses never carry `data`.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [ValidationIssue]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "request failed with internal error");
        }

        let details = match &self {
            ApiError::Validation(issues) => Some(issues.as_slice()),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(what) => ApiError::Conflict(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(format!("storage: {err}"))
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken => {
                ApiError::Forbidden("Invalid or expired token".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// A body that parses as JSON but does not fit the payload type (missing key,
/// wrong type, unknown enum value) is a validation failure. Anything else is a
/// plain bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                ApiError::Validation(vec![ValidationIssue::new("body", e.body_text())])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![ValidationIssue::new("query", rejection.body_text())])
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Property").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("db down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::Internal("connection refused at 10.0.0.3".into());
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn unparsable_query_is_a_validation_failure() {
        let uri: axum::http::Uri = "/?page=first".parse().unwrap();
        let rejection =
            axum::extract::Query::<crate::models::PropertyQuery>::try_from_uri(&uri).unwrap_err();
        let err = ApiError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            ApiError::Validation(issues) => assert_eq!(issues[0].field, "query"),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn repository_conflict_maps_to_409() {
        let err: ApiError = RepositoryError::Conflict("duplicate".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
