//! Quiz scoring and per-section quiz state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{percentage, round_stored};
use crate::config::PASS_THRESHOLD;

/// Latest answer of a student to a question; `selected_option_id` is
/// cleared (not deleted) on retake.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentAnswer {
    pub id: i32,
    pub student_id: Uuid,
    pub question_id: i32,
    pub selected_option_id: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentScore {
    pub id: i32,
    pub student_id: Uuid,
    pub section_id: i32,
    pub score: Decimal,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SectionAttempt {
    pub id: i32,
    pub student_id: Uuid,
    pub section_id: i32,
    pub attempt_count: i32,
}

/// Percentage score as stored, 0 for a section without questions.
pub fn compute_score(correct: usize, total: usize) -> Decimal {
    round_stored(percentage(correct, total))
}

/// Pass check on the exact ratio; the stored score may round up to the
/// threshold without passing.
pub fn is_passing(correct: usize, total: usize) -> bool {
    percentage(correct, total) >= Decimal::from(PASS_THRESHOLD)
}

/// Result of scoring a section for one student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScoreSummary {
    pub score: Decimal,
    pub passed: bool,
    pub correct_answers: usize,
    pub total_questions: usize,
}

impl ScoreSummary {
    pub fn new(correct_answers: usize, total_questions: usize) -> Self {
        Self {
            score: compute_score(correct_answers, total_questions),
            passed: is_passing(correct_answers, total_questions),
            correct_answers,
            total_questions,
        }
    }
}

/// Quiz lifecycle of a (student, section) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    NotStarted,
    InProgress,
    Passed,
    Failed,
}

impl QuizState {
    /// Derive the state from answered-question count and the stored score.
    ///
    /// A pass is sticky until a retake clears it; a failure is only reported
    /// once every question carries an answer.
    pub fn derive(answered: usize, total: usize, score: Option<&StudentScore>) -> Self {
        if score.is_some_and(|s| s.completed) {
            return QuizState::Passed;
        }
        if answered == 0 {
            return QuizState::NotStarted;
        }
        if total > 0 && answered >= total {
            return QuizState::Failed;
        }
        QuizState::InProgress
    }
}

/// Status view returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizStatus {
    pub state: QuizState,
    pub score: Decimal,
    pub answered_questions: usize,
    pub total_questions: usize,
    pub attempt_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stored(score: Decimal) -> StudentScore {
        StudentScore {
            id: 1,
            student_id: Uuid::nil(),
            section_id: 1,
            score,
            completed: score >= dec!(70),
        }
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(compute_score(0, 4), Decimal::ZERO);
        assert_eq!(compute_score(4, 4), dec!(100));
        assert_eq!(compute_score(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_three_of_four_passes() {
        let summary = ScoreSummary::new(3, 4);
        assert_eq!(summary.score, dec!(75));
        assert!(summary.passed);
    }

    #[test]
    fn test_score_rounds_to_two_places() {
        assert_eq!(compute_score(1, 3), dec!(33.33));
        assert_eq!(compute_score(2, 3), dec!(66.67));
    }

    #[test]
    fn test_completed_matches_threshold() {
        for (correct, total) in [(7, 10), (69, 100), (2, 3), (1, 1), (0, 5)] {
            let summary = ScoreSummary::new(correct, total);
            assert_eq!(summary.passed, summary.score >= dec!(70));
        }
    }

    #[test]
    fn test_pass_uses_exact_ratio() {
        // 69.996 % is stored as 70.00 but is still a fail
        let summary = ScoreSummary::new(17499, 25000);
        assert_eq!(summary.score, dec!(70.00));
        assert!(!summary.passed);
        assert!(is_passing(17500, 25000));
        assert!(!is_passing(0, 0));
    }

    #[test]
    fn test_state_derivation() {
        assert_eq!(QuizState::derive(0, 4, None), QuizState::NotStarted);
        assert_eq!(QuizState::derive(2, 4, Some(&stored(dec!(25)))), QuizState::InProgress);
        assert_eq!(QuizState::derive(4, 4, Some(&stored(dec!(50)))), QuizState::Failed);
        assert_eq!(QuizState::derive(4, 4, Some(&stored(dec!(75)))), QuizState::Passed);
        // Reset after retake: answers cleared, score zeroed
        assert_eq!(QuizState::derive(0, 4, Some(&stored(dec!(0)))), QuizState::NotStarted);
    }
}
