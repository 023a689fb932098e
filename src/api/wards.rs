//! Ward API endpoints

use crate::error::AppError;
use crate::models::WardSummary;
use crate::store::SharedStore;
use axum::{extract::State, response::Json};

/// GET /api/wards - List wards with complexes and average rating
pub async fn list_wards(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<WardSummary>>, AppError> {
    let wards = store.list_wards().await.map_err(AppError::FetchWards)?;
    Ok(Json(wards))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_wards_empty() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let Json(wards) = list_wards(State(store)).await.unwrap();
        assert!(wards.is_empty());
    }

    #[tokio::test]
    async fn test_list_wards_average_of_four_and_five() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let store: SharedStore = Arc::new(
            InMemoryStore::new()
                .with_ward(1, "Central")
                .with_review(1, 4.0, day)
                .with_review(1, 5.0, day),
        );
        let Json(wards) = list_wards(State(store)).await.unwrap();
        assert_eq!(wards.len(), 1);
        assert_eq!(wards[0].avg_rating, 4.5);
    }

    #[tokio::test]
    async fn test_list_wards_store_failure() {
        let memory = Arc::new(InMemoryStore::new().with_ward(1, "Central"));
        memory.set_offline(true);
        let result = list_wards(State(memory as SharedStore)).await;
        match result.unwrap_err() {
            AppError::FetchWards(_) => {}
            other => panic!("Expected FetchWards error, got: {:?}", other),
        }
    }
}
