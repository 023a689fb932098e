//! In-process store
//!
//! Holds the four tables in memory and reproduces the aggregation, ordering
//! and foreign-key behavior of the SQL store.

use super::{ReviewStore, StoreError};
use crate::models::{
    average_rating, join_complex_names, NewReview, Review, WardSummary, ANONYMOUS_REVIEWER,
};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    wards: BTreeMap<i64, String>,
    complexes: HashMap<i64, String>,
    ward_complexes: Vec<(i64, i64)>,
    reviews: Vec<Review>,
    next_review_id: i64,
}

/// Review store kept entirely in memory
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_review_id: 1,
                ..Tables::default()
            }),
            offline: AtomicBool::new(false),
        }
    }

    /// Add a ward
    pub fn with_ward(mut self, ward_id: i64, name: &str) -> Self {
        self.tables.get_mut().wards.insert(ward_id, name.to_string());
        self
    }

    /// Add a complex
    pub fn with_complex(mut self, complex_id: i64, name: &str) -> Self {
        self.tables
            .get_mut()
            .complexes
            .insert(complex_id, name.to_string());
        self
    }

    /// Associate a complex with a ward
    pub fn with_ward_complex(mut self, ward_id: i64, complex_id: i64) -> Self {
        let links = &mut self.tables.get_mut().ward_complexes;
        if !links.contains(&(ward_id, complex_id)) {
            links.push((ward_id, complex_id));
        }
        self
    }

    /// Add a review with an explicit date, as seed data would
    pub fn with_review(mut self, ward_id: i64, rating: f64, date: NaiveDate) -> Self {
        let t = self.tables.get_mut();
        let review_id = t.next_review_id;
        t.next_review_id += 1;
        t.reviews.push(Review {
            review_id,
            reviewer: Some(ANONYMOUS_REVIEWER.to_string()),
            rating,
            comment: Some(String::new()),
            date,
            ward_id,
        });
        self
    }

    /// Make every subsequent call fail as if the database were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored reviews
    pub async fn review_count(&self) -> usize {
        self.tables.read().await.reviews.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn list_wards(&self) -> Result<Vec<WardSummary>, StoreError> {
        self.check_online()?;
        let t = self.tables.read().await;

        let summaries = t
            .wards
            .iter()
            .map(|(&ward_id, name)| {
                let complexes = join_complex_names(
                    t.ward_complexes
                        .iter()
                        .filter(|(w, _)| *w == ward_id)
                        .filter_map(|(_, c)| t.complexes.get(c)),
                );
                let ratings: Vec<f64> = t
                    .reviews
                    .iter()
                    .filter(|r| r.ward_id == ward_id)
                    .map(|r| r.rating)
                    .collect();
                WardSummary {
                    ward_id,
                    ward_name: name.clone(),
                    complexes,
                    avg_rating: average_rating(&ratings),
                }
            })
            .collect();

        Ok(summaries)
    }

    async fn list_reviews(&self, ward_id: &str) -> Result<Vec<Review>, StoreError> {
        self.check_online()?;
        let Ok(ward_id) = ward_id.trim().parse::<i64>() else {
            return Ok(Vec::new());
        };

        let t = self.tables.read().await;
        let mut reviews: Vec<Review> = t
            .reviews
            .iter()
            .filter(|r| r.ward_id == ward_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.review_id.cmp(&a.review_id))
        });
        Ok(reviews)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<i64, StoreError> {
        self.check_online()?;
        let mut t = self.tables.write().await;
        if !t.wards.contains_key(&review.ward_id) {
            return Err(StoreError::UnknownWard(review.ward_id));
        }

        let review_id = t.next_review_id;
        t.next_review_id += 1;
        t.reviews.push(Review {
            review_id,
            reviewer: Some(review.reviewer.clone()),
            rating: review.rating,
            comment: Some(review.comment.clone()),
            date: Local::now().date_naive(),
            ward_id: review.ward_id,
        });
        Ok(review_id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
