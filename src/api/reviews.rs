//! Review API endpoints
//!
//! Listing reviews for a ward and submitting new ones. Submissions are
//! loosely typed: numbers may arrive as strings, and a field counts as
//! missing when it is absent, `null`, `false`, `0` or `""`.

use crate::error::AppError;
use crate::models::{NewReview, Review, ANONYMOUS_REVIEWER};
use crate::store::SharedStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Message returned when `ward_id` or `rating` is missing
pub const REQUIRED_FIELDS_MESSAGE: &str = "ward_id and rating are required";

/// Body of `POST /api/reviews`
#[derive(Debug, Default, Deserialize)]
pub struct SubmitReviewRequest {
    /// Reviewer name, optional
    #[serde(default)]
    pub reviewer: Value,
    /// Rating, required
    #[serde(default)]
    pub rating: Value,
    /// Comment, optional
    #[serde(default)]
    pub comment: Value,
    /// Target ward, required
    #[serde(default)]
    pub ward_id: Value,
}

/// Successful submission response
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    /// Always `true`
    pub success: bool,
    /// Generated id of the stored review
    pub review_id: i64,
}

impl SubmitReviewRequest {
    /// Read a request from a parsed JSON body
    ///
    /// Only a top-level object carries fields; any other JSON value (an
    /// array in particular) has neither `ward_id` nor `rating`.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        if !body.is_object() {
            return Err(AppError::InvalidReview(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        serde_json::from_value(body).map_err(|e| AppError::InvalidReview(e.to_string()))
    }

    /// Check required fields and apply defaults
    ///
    /// # Returns
    /// * `Ok(NewReview)` - Submission is valid
    /// * `Err(AppError::InvalidReview)` - Required field missing or unusable
    pub fn into_new_review(self) -> Result<NewReview, AppError> {
        if !is_truthy(&self.ward_id) || !is_truthy(&self.rating) {
            return Err(AppError::InvalidReview(REQUIRED_FIELDS_MESSAGE.to_string()));
        }

        let ward_id = as_integer(&self.ward_id).ok_or_else(|| {
            AppError::InvalidReview(format!("ward_id must be an integer, got {}", self.ward_id))
        })?;
        let rating = as_number(&self.rating).ok_or_else(|| {
            AppError::InvalidReview(format!("rating must be a number, got {}", self.rating))
        })?;

        Ok(NewReview {
            reviewer: text_or(&self.reviewer, ANONYMOUS_REVIEWER),
            rating,
            comment: text_or(&self.comment, ""),
            ward_id,
        })
    }
}

/// GET /api/reviews/:ward_id - List reviews for a ward, newest first
pub async fn list_reviews(
    State(store): State<SharedStore>,
    Path(ward_id): Path<String>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = store
        .list_reviews(&ward_id)
        .await
        .map_err(AppError::FetchReviews)?;
    Ok(Json(reviews))
}

/// POST /api/reviews - Store a new review
pub async fn submit_review(
    State(store): State<SharedStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitReviewResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::InvalidReview(e.body_text()))?;
    info!(body = %body, "Received review body");

    let review = SubmitReviewRequest::from_body(body)?.into_new_review()?;
    let review_id = store
        .insert_review(&review)
        .await
        .map_err(AppError::SubmitReview)?;

    info!(review_id, ward_id = review.ward_id, "Review inserted");
    Ok(Json(SubmitReviewResponse {
        success: true,
        review_id,
    }))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn text_or(value: &Value, default: &str) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        v if is_truthy(v) => v.to_string(),
        _ => default.to_string(),
    }
}
