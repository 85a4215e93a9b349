//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod answer_option;
pub mod cart;
pub mod cart_item;
pub mod collection;
pub mod completed_lesson;
pub mod course;
pub mod course_progress;
pub mod customer;
pub mod instructor_earnings;
pub mod lesson;
pub mod order;
pub mod order_item;
pub mod question;
pub mod rating;
pub mod section;
pub mod section_attempt;
pub mod student_answer;
pub mod student_score;
pub mod user;
