// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::upstream::UpstreamError;

#[derive(Debug, Serialize)]
pub struct ErrorResponseBody {
    pub error: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("missing {0}")]
    MissingParameter(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Upstream { message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        AppError::Upstream {
            message: msg.into(),
        }
    }

    /// The message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingParameter(name) => format!("missing {name}"),
            AppError::BadRequest(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Upstream { message } => message.clone(),
            AppError::Transport(_) => "error fetching from upstream".into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Api { message, .. } => AppError::Upstream { message },
            UpstreamError::Transport(detail) => AppError::Transport(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Transport(detail) => error!("upstream transport failure: {detail}"),
            AppError::Upstream { message } => warn!("upstream rejected request: {message}"),
            _ => {}
        }

        let body = Json(ErrorResponseBody {
            error: self.user_message(),
        });
        (status, body).into_response()
    }
}
