//! MySQL-backed store
//!
//! Works against MySQL 8 and TiDB. Numeric columns are cast in the queries so
//! decoding does not depend on whether the schema uses `INT`, `BIGINT`,
//! `DECIMAL` or unsigned variants.

use super::{ReviewStore, StoreError};
use crate::config::{redact_url, DatabaseConfig};
use crate::models::{NewReview, Review, WardSummary};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlSslMode};
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, info};

const LIST_WARDS_SQL: &str = r#"
SELECT
    CAST(w.ward_id AS SIGNED) AS ward_id,
    w.name AS ward_name,
    GROUP_CONCAT(DISTINCT c.name ORDER BY c.name SEPARATOR ', ') AS complexes,
    CAST(COALESCE(ROUND(AVG(r.rating), 2), 0) AS DOUBLE) AS avg_rating
FROM Ward w
LEFT JOIN Ward_has_Complex whc ON w.ward_id = whc.ward_id
LEFT JOIN Complex c ON c.complex_id = whc.complex_id
LEFT JOIN Review r ON r.ward_id = w.ward_id
GROUP BY w.ward_id, w.name
ORDER BY w.ward_id
"#;

const LIST_REVIEWS_SQL: &str = r#"
SELECT
    CAST(review_id AS SIGNED) AS review_id,
    reviewer,
    CAST(rating AS DOUBLE) AS rating,
    comment,
    `date`,
    CAST(ward_id AS SIGNED) AS ward_id
FROM Review
WHERE ward_id = ?
ORDER BY `date` DESC, review_id DESC
"#;

const INSERT_REVIEW_SQL: &str =
    "INSERT INTO Review (reviewer, rating, comment, `date`, ward_id) VALUES (?, ?, ?, CURDATE(), ?)";

/// Review store backed by a MySQL connection pool
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect to the database described by `config`
    ///
    /// When a CA certificate is configured the connection requires TLS and
    /// verifies the server certificate and host name against it.
    ///
    /// # Returns
    /// * `Ok(MySqlStore)` if successful
    /// * `Err(StoreError)` if the URL is invalid or the connection failed
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = MySqlConnectOptions::from_str(&config.url)?;
        if let Some(ca_path) = &config.ca_path {
            options = options
                .ssl_mode(MySqlSslMode::VerifyIdentity)
                .ssl_ca(ca_path);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(
            url = %redact_url(&config.url),
            tls = config.ca_path.is_some(),
            max_connections = config.max_connections,
            "Connected to MySQL database"
        );

        let store = Self { pool };
        if config.auto_migrate {
            store.run_migrations().await?;
        }
        Ok(store)
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the schema tables if they do not exist
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_schema.sql");
        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::Migration(format!(
                        "{} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }

    /// Get the database pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ReviewStore for MySqlStore {
    async fn list_wards(&self) -> Result<Vec<WardSummary>, StoreError> {
        let wards = sqlx::query_as::<_, WardSummary>(LIST_WARDS_SQL)
            .fetch_all(&self.pool)
            .await?;
        debug!(count = wards.len(), "Fetched wards");
        Ok(wards)
    }

    async fn list_reviews(&self, ward_id: &str) -> Result<Vec<Review>, StoreError> {
        // Bound as text: the database does the comparison, so a non-numeric
        // segment simply matches nothing.
        let reviews = sqlx::query_as::<_, Review>(LIST_REVIEWS_SQL)
            .bind(ward_id)
            .fetch_all(&self.pool)
            .await?;
        debug!(ward_id, count = reviews.len(), "Fetched reviews");
        Ok(reviews)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<i64, StoreError> {
        let result = sqlx::query(INSERT_REVIEW_SQL)
            .bind(&review.reviewer)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.ward_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Split a SQL script into statements, dropping `--` comments and blank lines
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements_strips_comments() {
        let sql = "-- header\nCREATE TABLE a (id INT); -- trailing\n\nCREATE TABLE b (\n  id INT -- pk\n);\n";
        let statements = split_statements(sql);
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (id INT)", "CREATE TABLE b ( id INT )"]
        );
    }

    #[test]
    fn test_bundled_migration_creates_all_tables() {
        let statements = split_statements(include_str!("../../migrations/001_create_schema.sql"));
        assert_eq!(statements.len(), 4);
        for table in ["Ward", "Complex", "Ward_has_Complex", "Review"] {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} ", table);
            assert!(
                statements.iter().any(|s| s.starts_with(&needle)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_ward_query_shape() {
        assert!(LIST_WARDS_SQL.contains("GROUP_CONCAT(DISTINCT c.name ORDER BY c.name SEPARATOR ', ')"));
        assert!(LIST_WARDS_SQL.contains("COALESCE(ROUND(AVG(r.rating), 2), 0)"));
        assert!(LIST_WARDS_SQL.trim_end().ends_with("ORDER BY w.ward_id"));
    }
}
