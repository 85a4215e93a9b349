//! Progress, rating and earnings projections.
//!
//! Every function here is a pure projection over stored facts so that
//! recomputing from the same rows always yields the same value.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{percentage, round_stored};
use crate::config::{COMPLETION_THRESHOLD, MAX_RATING_SCORE, MIN_RATING_SCORE};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgress {
    pub id: i32,
    pub student_id: Uuid,
    pub course_id: i32,
    pub progress: Decimal,
    pub completed: bool,
    pub completed_lessons: Vec<i32>,
    pub last_accessed: DateTime<Utc>,
}

impl CourseProgress {
    /// Lessons are "opened" exactly when they are in the completed set.
    pub fn has_completed(&self, lesson_id: i32) -> bool {
        self.completed_lessons.contains(&lesson_id)
    }
}

/// Percentage of course lessons completed, 0 for a course without lessons.
pub fn progress_percent(completed: usize, total: usize) -> Decimal {
    round_stored(percentage(completed.min(total), total))
}

/// Judged on the exact ratio, not the stored percentage.
pub fn is_course_complete(completed: usize, total: usize) -> bool {
    total > 0 && percentage(completed.min(total), total) >= Decimal::from(COMPLETION_THRESHOLD)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Rating {
    pub id: i32,
    pub user_id: Uuid,
    pub course_id: i32,
    pub score: Decimal,
    pub created_at: DateTime<Utc>,
}

pub fn validate_rating_score(score: Decimal) -> AppResult<Decimal> {
    if score < Decimal::from(MIN_RATING_SCORE) || score > Decimal::from(MAX_RATING_SCORE) {
        return Err(AppError::validation(format!(
            "Rating score must be between {} and {}",
            MIN_RATING_SCORE, MAX_RATING_SCORE
        )));
    }
    Ok(round_stored(score))
}

/// Derived rating fields of a course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct RatingAggregate {
    pub rating_count: i32,
    pub average_rating: f64,
}

impl RatingAggregate {
    pub fn from_scores(scores: &[Decimal]) -> Self {
        if scores.is_empty() {
            return Self { rating_count: 0, average_rating: 0.0 };
        }
        let sum: Decimal = scores.iter().sum();
        let mean = round_stored(sum / Decimal::from(scores.len() as u64));
        Self {
            rating_count: scores.len() as i32,
            average_rating: mean.to_f64().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstructorEarnings {
    pub id: i32,
    pub instructor_id: Uuid,
    pub total_earnings: Decimal,
    pub last_payout: Option<DateTime<Utc>>,
    pub deduction_percentage: Decimal,
}

/// Net instructor earnings over completed sale prices.
pub fn net_earnings(prices: &[Decimal], deduction_percentage: Decimal) -> Decimal {
    let keep = Decimal::ONE - deduction_percentage / Decimal::ONE_HUNDRED;
    let total = prices
        .iter()
        .map(|price| *price * keep)
        .sum::<Decimal>();
    round_stored(total)
}

/// Earnings view returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EarningsReport {
    pub earnings_after_deduction: Decimal,
    pub last_payout: Option<DateTime<Utc>>,
    pub total_students_enrolled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), Decimal::ZERO);
        assert_eq!(progress_percent(1, 4), dec!(25));
        assert_eq!(progress_percent(4, 4), dec!(100));
        assert_eq!(progress_percent(1, 3), dec!(33.33));
        assert!(is_course_complete(3, 3));
        assert!(!is_course_complete(2, 3));
        assert!(!is_course_complete(0, 0));
        // 99.996 % rounds to 100.00 for storage but the course is unfinished
        assert_eq!(progress_percent(24999, 25000), dec!(100.00));
        assert!(!is_course_complete(24999, 25000));
    }

    #[test]
    fn test_progress_is_idempotent() {
        let first = progress_percent(2, 7);
        let second = progress_percent(2, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rating_aggregate() {
        let empty = RatingAggregate::from_scores(&[]);
        assert_eq!(empty.rating_count, 0);
        assert_eq!(empty.average_rating, 0.0);

        let agg = RatingAggregate::from_scores(&[dec!(5), dec!(4), dec!(4)]);
        assert_eq!(agg.rating_count, 3);
        assert_eq!(agg.average_rating, 4.33);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating_score(dec!(0.5)).is_err());
        assert!(validate_rating_score(dec!(5.5)).is_err());
        assert_eq!(validate_rating_score(dec!(4.5)).unwrap(), dec!(4.5));
    }

    #[test]
    fn test_net_earnings() {
        assert_eq!(net_earnings(&[dec!(10.00), dec!(20.00)], dec!(50)), dec!(15.00));
        assert_eq!(net_earnings(&[dec!(19.99)], dec!(30)), dec!(13.99));
        assert_eq!(net_earnings(&[], dec!(50)), Decimal::ZERO);
    }
}
