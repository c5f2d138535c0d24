use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::error::DomainError;
use crate::presentation::view::renderer::RenderError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("malformed post id: '{0}'")]
    MalformedId(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::MalformedId(_) => {
                warn!(error = %self, "rejecting request");
                (StatusCode::NOT_FOUND, "not found")
            }
            AppError::Domain(err) => match err {
                DomainError::NotFound(_) => {
                    warn!(error = %self, "rejecting request");
                    (StatusCode::NOT_FOUND, "not found")
                }
                DomainError::Validation { .. } => {
                    warn!(error = %self, "rejecting request");
                    (StatusCode::BAD_REQUEST, "bad request")
                }
                DomainError::Storage(_) => {
                    error!(error = %self, "storage failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
                }
            },
            AppError::Render(_) => {
                error!(error = %self, "render failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };

        (status, msg).into_response()
    }
}
