use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use readrise_core::ProgressionError;
use services::{ContentServiceError, PlayError};
use storage::repository::StorageError;

use super::types::ErrorBody;

/// Everything a handler can fail with, mapped to a status code and an
/// [`ErrorBody`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("sign in to play")]
    Unauthorized,
    #[error("invalid path parameter: {0}")]
    InvalidPath(#[from] PathRejection),
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error(transparent)]
    Content(#[from] ContentServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "invalid_path"),
            ApiError::Play(PlayError::Progression(e)) => match e {
                ProgressionError::LevelLocked(_) => (StatusCode::FORBIDDEN, "level_locked"),
                ProgressionError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ProgressionError::IncompleteAnswers { .. } => {
                    (StatusCode::CONFLICT, "incomplete_answers")
                }
                ProgressionError::AlreadyCompleted(_) => {
                    (StatusCode::CONFLICT, "already_completed")
                }
                _ => (StatusCode::CONFLICT, "progression"),
            },
            ApiError::Play(PlayError::Navigation(_)) => {
                (StatusCode::CONFLICT, "invalid_navigation")
            }
            ApiError::Content(ContentServiceError::Catalog(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_catalog")
            }
            ApiError::Play(PlayError::Storage(_))
            | ApiError::Content(ContentServiceError::Storage(_))
            | ApiError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
            ApiError::Play(_) | ApiError::Content(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::debug!(error = %self, code, "request rejected");
        }

        let unanswered = match &self {
            ApiError::Play(PlayError::Progression(ProgressionError::IncompleteAnswers {
                unanswered,
            })) => unanswered.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
            unanswered,
        };
        (status, Json(body)).into_response()
    }
}
