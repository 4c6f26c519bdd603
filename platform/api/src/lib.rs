use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use platform_authn::AuthnError;
use platform_authz::Denied;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Shared result type for blog operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    /// A multi-step write failed part way and was rolled back.
    #[error("operation rolled back")]
    AtomicityFailure(Arc<anyhow::Error>),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

/// JSON body returned for every error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::AtomicityFailure(_) => "ROLLED_BACK",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::AtomicityFailure(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(Arc::new(err.into()))
    }

    pub fn rolled_back(err: impl Into<anyhow::Error>) -> Self {
        Self::AtomicityFailure(Arc::new(err.into()))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<DbErr> for ApiError {
    fn from(value: DbErr) -> Self {
        Self::internal(value)
    }
}

impl From<Denied> for ApiError {
    fn from(value: Denied) -> Self {
        match value {
            Denied::NotFound(resource) => ApiError::NotFound(resource.as_str()),
            Denied::Unauthenticated => ApiError::Unauthenticated,
            Denied::Forbidden => ApiError::Forbidden,
            Denied::Invalid(invalid) => ApiError::InvalidInput(invalid.to_string()),
        }
    }
}

impl From<AuthnError> for ApiError {
    fn from(value: AuthnError) -> Self {
        match value {
            AuthnError::InvalidToken | AuthnError::TokenExpired => ApiError::Unauthenticated,
            other => ApiError::internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidInput(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => error!(error = ?err, "request failed"),
            ApiError::AtomicityFailure(err) => error!(error = ?err, "write rolled back"),
            other => debug!(code = other.code(), "request denied"),
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
