//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    cart_handler, catalog_handler, instructor_handler, order_handler, progress_handler,
    quiz_handler, rating_handler,
};
use crate::domain::{
    CartLine, CartSnapshot, Collection, Course, CourseProgress, Currency, EarningsReport, Lesson,
    Level, OptionView, OrderItem, OrderSnapshot, PaymentStatus, QuestionView, QuizState,
    QuizStatus, Rating, Section, StudentAnswer, UserRole,
};
use crate::services::{
    AnswerInput, AnswerOutcome, CourseStatistics, LessonSnapshot, QuizProgress, QuizResult,
    RetakeOutcome,
};
use crate::types::MessageResponse;

/// OpenAPI documentation for the Course Engine
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Engine",
        version = "0.1.0",
        description = "Commerce and progression engine for an online course marketplace",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Catalog
        catalog_handler::create_collection,
        catalog_handler::create_course,
        catalog_handler::get_course,
        catalog_handler::course_statistics,
        catalog_handler::list_sections,
        catalog_handler::create_section,
        catalog_handler::list_lessons,
        catalog_handler::create_lesson,
        catalog_handler::update_lesson,
        catalog_handler::delete_lesson,
        catalog_handler::list_questions,
        catalog_handler::create_question,
        // Carts
        cart_handler::get_cart,
        cart_handler::add_item,
        cart_handler::remove_item,
        // Orders
        order_handler::checkout,
        order_handler::list_orders,
        order_handler::settle_order,
        // Quiz
        quiz_handler::submit_answer,
        quiz_handler::submit_all_answers,
        quiz_handler::retake,
        quiz_handler::quiz_status,
        // Progress
        progress_handler::mark_as_finished,
        progress_handler::mark_as_unfinished,
        progress_handler::get_progress,
        // Ratings
        rating_handler::rate_course,
        rating_handler::update_rating,
        rating_handler::delete_rating,
        // Instructors
        instructor_handler::get_earnings,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            Level,
            Currency,
            Collection,
            Course,
            Section,
            Lesson,
            QuestionView,
            OptionView,
            CartSnapshot,
            CartLine,
            PaymentStatus,
            OrderSnapshot,
            OrderItem,
            CourseProgress,
            Rating,
            EarningsReport,
            StudentAnswer,
            QuizState,
            QuizStatus,
            // Service results
            CourseStatistics,
            LessonSnapshot,
            AnswerInput,
            AnswerOutcome,
            QuizResult,
            QuizProgress,
            RetakeOutcome,
            MessageResponse,
            // Requests
            catalog_handler::CreateCollectionRequest,
            catalog_handler::CreateCourseRequest,
            catalog_handler::CreateSectionRequest,
            catalog_handler::CreateLessonRequest,
            catalog_handler::UpdateLessonRequest,
            catalog_handler::CreateQuestionRequest,
            catalog_handler::CreateOptionRequest,
            cart_handler::AddItemRequest,
            order_handler::SettleOrderRequest,
            quiz_handler::SubmitAnswerRequest,
            quiz_handler::SubmitAllAnswersRequest,
            rating_handler::RatingRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Catalog", description = "Collections, courses, sections, lessons and questions"),
        (name = "Carts", description = "Shopping cart"),
        (name = "Orders", description = "Checkout and payment settlement"),
        (name = "Quiz", description = "Section quizzes and retakes"),
        (name = "Progress", description = "Lesson completion and course progress"),
        (name = "Ratings", description = "Course ratings"),
        (name = "Instructors", description = "Instructor earnings")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/orders/checkout"));
        assert!(doc
            .paths
            .paths
            .contains_key("/courses/{course_id}/sections/{section_id}/questions/answer-all"));
        assert!(doc.paths.paths.contains_key("/instructors/{instructor_id}/earnings"));
    }
}
