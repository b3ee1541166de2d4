use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{ChartError, IngestionError};

/// Every way a request can fail, mapped to a status code and a `{"detail"}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    /// A required form field was absent.
    #[error("Field required: {0}")]
    MissingField(&'static str),

    /// The request body was not a readable multipart form.
    #[error("Invalid form data: {0}")]
    InvalidForm(String),

    /// The body exceeded the configured upload limit.
    #[error("Upload exceeds the size limit")]
    TooLarge,

    /// Parsing or rendering on the blocking pool panicked or was cancelled.
    #[error("background task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge
        } else {
            Self::InvalidForm(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        Self::InvalidForm(err.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ingestion(_) => StatusCode::BAD_REQUEST,
            Self::Chart(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Chart(_) | Self::BlockingTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingField(_) | Self::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Client-facing message.
    pub fn detail(&self) -> String {
        match self {
            Self::Ingestion(IngestionError::UnsupportedFormat { .. }) => {
                "Unsupported file format. Upload CSV or Excel file.".to_string()
            }
            Self::Ingestion(e) => format!("File reading failed: {e}"),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
