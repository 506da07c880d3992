//! Application errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::error_response;
use crate::sessions::SessionError;
use crate::storage::StorageError;
use crate::templates::TemplateError;

/// Business-rule failures raised by the app services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Anything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Service(e) => match e {
                ServiceError::MissingField(_) => StatusCode::BAD_REQUEST,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Template(_) => StatusCode::EXPECTATION_FAILED,
            AppError::Storage(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            return error_response(status);
        }
        tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        (status, format!("{}\n", self)).into_response()
    }
}
