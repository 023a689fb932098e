//! Ward and review data models
//!
//! Row types returned by the store and the aggregation rules that define a
//! ward summary.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reviewer name stored when a submission does not provide one
pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

/// Separator between complex names in a ward summary
pub const COMPLEX_SEPARATOR: &str = ", ";

/// One row of `GET /api/wards`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WardSummary {
    /// Ward primary key
    pub ward_id: i64,
    /// Ward display name
    pub ward_name: String,
    /// Sorted, distinct complex names joined by `", "`; `None` if the ward has none
    pub complexes: Option<String>,
    /// Mean review rating rounded to two decimals, `0` without reviews
    pub avg_rating: f64,
}

/// A stored review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    /// Review primary key
    pub review_id: i64,
    /// Reviewer name (nullable in seed data)
    pub reviewer: Option<String>,
    /// Numeric rating
    pub rating: f64,
    /// Free-form comment (nullable in seed data)
    pub comment: Option<String>,
    /// Date the review was stored
    pub date: NaiveDate,
    /// Ward the review belongs to
    pub ward_id: i64,
}

/// A validated review submission with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    /// Reviewer name, `"Anonymous"` when omitted
    pub reviewer: String,
    /// Numeric rating, never zero
    pub rating: f64,
    /// Comment, empty when omitted
    pub comment: String,
    /// Target ward
    pub ward_id: i64,
}

/// Round to two decimal places, half away from zero (SQL `ROUND(x, 2)`)
pub fn round_rating(value: f64) -> f64 {
    round_decimal(to_decimal(value))
}

/// Mean of `ratings` rounded to two decimals, or `0` for an empty slice
///
/// Summed and divided in decimal, as `AVG` over a `DECIMAL` column is.
pub fn average_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: Decimal = ratings.iter().copied().map(to_decimal).sum();
    round_decimal(sum / Decimal::from(ratings.len()))
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

// Exact hundredths divided once, so the result is the f64 nearest the decimal.
fn round_decimal(value: Decimal) -> f64 {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.mantissa() as f64 / 100.0
}

/// Sort, deduplicate and join complex names
///
/// Mirrors `GROUP_CONCAT(DISTINCT name ORDER BY name SEPARATOR ', ')`,
/// including the `NULL` result for an empty group.
pub fn join_complex_names<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    if names.is_empty() {
        return None;
    }
    names.sort();
    names.dedup();
    Some(names.join(COMPLEX_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating_empty_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average_rating_four_and_five() {
        assert_eq!(average_rating(&[4.0, 5.0]), 4.5);
    }

    #[test]
    fn test_average_rating_rounds_to_two_decimals() {
        // 10 / 3 = 3.333...
        assert_eq!(average_rating(&[3.0, 3.0, 4.0]), 3.33);
        // 11 / 3 = 3.666...
        assert_eq!(average_rating(&[3.0, 4.0, 4.0]), 3.67);
    }

    #[test]
    fn test_average_rating_decimal_midpoint() {
        // 2.01 / 2 = 1.005 exactly in decimal
        assert_eq!(average_rating(&[1.0, 1.01]), 1.01);
        assert_eq!(average_rating(&[2.0, 2.01]), 2.01);
        assert_eq!(average_rating(&[4.0, 4.25]), 4.13);
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(4.125), 4.13);
        assert_eq!(round_rating(2.0), 2.0);
        assert_eq!(round_rating(1.994), 1.99);
        assert_eq!(round_rating(1.005), 1.01);
    }

    #[test]
    fn test_join_complex_names_sorted_and_distinct() {
        let joined = join_complex_names(["Sunrise", "Harbor", "Sunrise", "Elm Court"]);
        assert_eq!(joined.as_deref(), Some("Elm Court, Harbor, Sunrise"));
    }

    #[test]
    fn test_join_complex_names_empty_is_none() {
        let names: Vec<&str> = vec![];
        assert_eq!(join_complex_names(names), None);
    }

    #[test]
    fn test_review_date_serializes_as_calendar_date() {
        let review = Review {
            review_id: 7,
            reviewer: Some("Ana".to_string()),
            rating: 4.5,
            comment: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            ward_id: 2,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["date"], "2025-03-14");
        assert!(json["comment"].is_null());
        assert_eq!(json["rating"], 4.5);
    }
}
