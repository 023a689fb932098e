//! Error types and error handling for the application
//!
//! Every handler returns `Result<_, AppError>`. Read routes answer with
//! `{"error": ...}`, the submit route with `{"success": false, "error": ...}`.
//! Validation and data-access failures both map to 500.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Ward listing failed
    #[error("Error fetching wards")]
    FetchWards(#[source] StoreError),

    /// Review listing failed
    #[error("Error fetching reviews")]
    FetchReviews(#[source] StoreError),

    /// Review submission is missing required fields or is malformed
    #[error("{0}")]
    InvalidReview(String),

    /// Review insert failed
    #[error("{0}")]
    SubmitReview(#[source] StoreError),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::FetchWards(source) => {
                tracing::error!(error = %source, "Error fetching wards");
                json!({ "error": self.to_string() })
            }
            AppError::FetchReviews(source) => {
                tracing::error!(error = %source, "Error fetching reviews");
                json!({ "error": self.to_string() })
            }
            AppError::InvalidReview(message) => {
                tracing::error!(error = %message, "Error adding review");
                json!({ "success": false, "error": self.to_string() })
            }
            AppError::SubmitReview(source) => {
                tracing::error!(error = %source, "Error adding review");
                json!({ "success": false, "error": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
