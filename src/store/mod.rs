//! Review storage
//!
//! The `ReviewStore` trait is the database handle shared by all request
//! handlers. `MySqlStore` talks to the real database; `InMemoryStore` keeps
//! the same semantics in process for tests and local runs.

pub mod memory;
pub mod mysql;

use crate::models::{NewReview, Review, WardSummary};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

/// Errors raised by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query or connection failure reported by the driver
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Schema bootstrap failed
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Review references a ward that does not exist
    #[error("Cannot add or update a child row: a foreign key constraint fails (ward_id {0})")]
    UnknownWard(i64),
}

/// Shared handle injected into every handler
pub type SharedStore = Arc<dyn ReviewStore>;

/// Data access for wards and reviews
///
/// Each method maps to exactly one statement against the backing database.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All wards with their complexes and average rating, ordered by `ward_id`
    async fn list_wards(&self) -> Result<Vec<WardSummary>, StoreError>;

    /// Reviews for the ward identified by the raw path segment, newest first
    async fn list_reviews(&self, ward_id: &str) -> Result<Vec<Review>, StoreError>;

    /// Insert a review dated today and return its generated id
    async fn insert_review(&self, review: &NewReview) -> Result<i64, StoreError>;

    /// Check that the backing database answers
    async fn ping(&self) -> Result<(), StoreError>;
}
