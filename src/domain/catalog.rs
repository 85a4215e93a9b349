//! Catalog entities: courses, sections, lessons and quiz questions.
//!
//! The catalog is the read-mostly structure every other component consumes.
//! Aggregate fields on `Course` and `Section` are derived and only written by
//! the recomputation routines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::VIDEO_EXTENSIONS;

/// Course difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        match s {
            "Intermediate" => Level::Intermediate,
            "Advanced" => Level::Advanced,
            _ => Level::Beginner,
        }
    }
}

/// Price currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        match s {
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            _ => Currency::Usd,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Collection {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Course {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    pub level: Level,
    pub is_active: bool,
    pub collection_id: i32,
    pub instructor_id: Uuid,
    pub preview: String,
    pub rating_count: i32,
    pub average_rating: f64,
    #[serde(rename = "numberOfStudents")]
    pub number_of_students: i32,
    /// Seconds
    pub total_duration: i64,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.instructor_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Section {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    /// Explicit sequence within the course, unique per course
    pub position: i32,
    pub locked: bool,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub number_of_lessons: i32,
    pub total_duration: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Lesson {
    pub id: i32,
    pub section_id: i32,
    pub title: String,
    pub file: Option<String>,
    pub order: i32,
    pub duration: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i32,
    pub section_id: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOption {
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub is_correct: bool,
}

/// Question as shown to a caller; correctness only when revealed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: i32,
    pub section_id: i32,
    pub text: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptionView {
    pub id: i32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl QuestionView {
    pub fn build(question: Question, options: Vec<AnswerOption>, reveal_correctness: bool) -> Self {
        Self {
            id: question.id,
            section_id: question.section_id,
            text: question.text,
            options: options
                .into_iter()
                .filter(|o| o.question_id == question.id)
                .map(|o| OptionView {
                    id: o.id,
                    text: o.text,
                    is_correct: reveal_correctness.then_some(o.is_correct),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    pub level: Level,
    pub collection_id: i32,
    pub preview: String,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub title: String,
    pub locked: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub file: Option<String>,
    /// Duration reported by content ingestion, in seconds
    pub duration: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LessonChanges {
    pub title: Option<String>,
    pub file: Option<String>,
    pub duration: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

// =============================================================================
// Rules
// =============================================================================

/// True when the file name carries a known video extension.
pub fn is_video_file(file: &str) -> bool {
    file.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Stored lesson duration: the reported value for video files, zero otherwise.
pub fn lesson_duration(file: Option<&str>, reported: i64) -> i64 {
    match file {
        Some(name) if is_video_file(name) => reported.max(0),
        _ => 0,
    }
}

/// The section immediately before `current` in its course, by position.
pub fn previous_section<'a>(sections: &'a [Section], current: &Section) -> Option<&'a Section> {
    sections
        .iter()
        .filter(|s| s.course_id == current.course_id && s.position < current.position)
        .max_by_key(|s| s.position)
}

/// Next sequence number after the current maximum; never reuses a number.
pub fn next_sequence(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Derived counters of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionTotals {
    pub number_of_lessons: i32,
    pub total_duration: i64,
}

impl SectionTotals {
    pub fn from_lessons(lessons: &[Lesson]) -> Self {
        Self {
            number_of_lessons: lessons.len() as i32,
            total_duration: lessons.iter().map(|l| l.duration).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: i32, position: i32) -> Section {
        Section {
            id,
            course_id: 1,
            title: format!("Section {}", position),
            position,
            locked: false,
            is_default: position == 1,
            number_of_lessons: 0,
            total_duration: 0,
        }
    }

    #[test]
    fn test_video_detection() {
        assert!(is_video_file("intro.MP4"));
        assert!(is_video_file("lesson.final.mkv"));
        assert!(!is_video_file("notes.pdf"));
        assert!(!is_video_file("README"));
    }

    #[test]
    fn test_non_video_lessons_have_zero_duration() {
        assert_eq!(lesson_duration(Some("talk.mov"), 300), 300);
        assert_eq!(lesson_duration(Some("slides.pdf"), 300), 0);
        assert_eq!(lesson_duration(None, 300), 0);
        assert_eq!(lesson_duration(Some("talk.mov"), -5), 0);
    }

    #[test]
    fn test_previous_section_uses_position_not_id() {
        // Section 30 was recreated after 20 but sits at position 1
        let sections = vec![section(30, 1), section(10, 2), section(20, 3)];
        assert_eq!(previous_section(&sections, &sections[2]).map(|s| s.id), Some(10));
        assert_eq!(previous_section(&sections, &sections[1]).map(|s| s.id), Some(30));
        assert!(previous_section(&sections, &sections[0]).is_none());
    }

    #[test]
    fn test_next_sequence() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(next_sequence(Some(4)), 5);
    }

    #[test]
    fn test_question_view_hides_correctness() {
        let question = Question { id: 7, section_id: 1, text: "2+2?".into() };
        let options = vec![
            AnswerOption { id: 1, question_id: 7, text: "4".into(), is_correct: true },
            AnswerOption { id: 2, question_id: 7, text: "5".into(), is_correct: false },
        ];

        let hidden = QuestionView::build(question.clone(), options.clone(), false);
        assert!(hidden.options.iter().all(|o| o.is_correct.is_none()));

        let revealed = QuestionView::build(question, options, true);
        assert_eq!(revealed.options[0].is_correct, Some(true));
    }

    #[test]
    fn test_section_totals() {
        let lessons = vec![
            Lesson { id: 1, section_id: 1, title: "a".into(), file: None, order: 1, duration: 0, is_active: true },
            Lesson { id: 2, section_id: 1, title: "b".into(), file: None, order: 2, duration: 120, is_active: true },
        ];
        let totals = SectionTotals::from_lessons(&lessons);
        assert_eq!(totals.number_of_lessons, 2);
        assert_eq!(totals.total_duration, 120);
    }
}
