//! Domain layer - Core business entities and logic
//!
//! Pure types and functions: catalog structure, commerce records, the
//! capability table, quiz scoring and the aggregate projections.
//! Nothing in this module performs I/O.

pub mod access;
pub mod catalog;
pub mod commerce;
pub mod events;
pub mod progress;
pub mod quiz;
pub mod user;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::ROUNDING_SCALE;

pub use access::{is_permitted, policy, section_unlocked, AccessFacts, Action, Policy};
pub use catalog::{
    AnswerOption, Collection, Course, Currency, Lesson, LessonChanges, Level, NewCourse,
    NewLesson, NewOption, NewQuestion, NewSection, OptionView, Question, QuestionView, Section,
    SectionTotals,
};
pub use commerce::{
    Cart, CartItem, CartLine, CartSnapshot, Order, OrderItem, OrderSnapshot, PaymentPolicy,
    PaymentStatus,
};
pub use events::{DomainEvent, Notification, NotificationKind, PurchasedCourse};
pub use progress::{
    CourseProgress, EarningsReport, InstructorEarnings, Rating, RatingAggregate,
};
pub use quiz::{QuizState, QuizStatus, ScoreSummary, SectionAttempt, StudentAnswer, StudentScore};
pub use user::{Actor, Customer, User, UserRole};

/// `part` of `whole` as an unrounded percentage, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::ONE_HUNDRED * Decimal::from(part as u64) / Decimal::from(whole as u64)
}

/// Stored precision for scores, progress, ratings and money. Ties round
/// away from zero.
pub fn round_stored(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(ROUNDING_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
