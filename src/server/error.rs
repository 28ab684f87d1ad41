//! HTTP error mapping to RFC-9457 Problem Details

use crate::utils::error::{ErrorCategory, EtlError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn not_found() -> Self {
        Problem::new(StatusCode::NOT_FOUND, "Not Found").with_detail("File not found")
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<EtlError> for Problem {
    fn from(error: EtlError) -> Self {
        match (&error, error.category()) {
            (EtlError::NotFoundError { .. }, _) => Problem::not_found(),
            (EtlError::ValidationError { .. }, ErrorCategory::Input) => {
                Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                    .with_detail(error.user_friendly_message())
            }
            (_, ErrorCategory::Input) => Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid Input")
                .with_detail(error.user_friendly_message()),
            _ => {
                tracing::error!("Request failed: {}", error);
                Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .with_detail("An internal error occurred")
            }
        }
    }
}
