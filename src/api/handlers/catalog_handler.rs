//! Catalog handlers: collections, courses, sections, lessons and questions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    Collection, Course, Currency, Lesson, LessonChanges, Level, NewCourse, NewLesson, NewOption,
    NewQuestion, NewSection, QuestionView, Section,
};
use crate::errors::AppResult;
use crate::services::CourseStatistics;
use crate::types::MessageResponse;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    #[schema(example = "Web Development")]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = f64, example = 49.99)]
    pub price: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub level: Level,
    pub collection_id: i32,
    #[serde(default)]
    pub preview: String,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            currency: req.currency,
            level: req.level,
            collection_id: req.collection_id,
            preview: req.preview,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSectionRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    /// Locked sections open once the previous section's quiz is passed
    #[serde(default)]
    pub locked: bool,
    #[serde(default, rename = "default")]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub file: Option<String>,
    /// Seconds, as measured by content ingestion
    #[serde(default)]
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub file: Option<String>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration: Option<i64>,
    pub is_active: Option<bool>,
}

impl From<UpdateLessonRequest> for LessonChanges {
    fn from(req: UpdateLessonRequest) -> Self {
        Self {
            title: req.title,
            file: req.file,
            duration: req.duration,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOptionRequest {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl From<CreateQuestionRequest> for NewQuestion {
    fn from(req: CreateQuestionRequest) -> Self {
        Self {
            text: req.text,
            options: req
                .options
                .into_iter()
                .map(|o| NewOption {
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Create catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/collections", post(create_collection))
        .route("/courses", post(create_course))
        .route("/courses/:course_id", get(get_course))
        .route("/courses/:course_id/statistics", get(course_statistics))
        .route(
            "/courses/:course_id/sections",
            get(list_sections).post(create_section),
        )
        .route(
            "/courses/:course_id/sections/:section_id/lessons",
            get(list_lessons).post(create_lesson),
        )
        .route(
            "/courses/:course_id/sections/:section_id/questions",
            get(list_questions).post(create_question),
        )
        .route("/lessons/:lesson_id", put(update_lesson).delete(delete_lesson))
}

/// Create a course collection
#[utoipa::path(
    post,
    path = "/collections",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = Collection),
        (status = 403, description = "Students cannot create collections")
    )
)]
pub async fn create_collection(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCollectionRequest>,
) -> AppResult<(StatusCode, Json<Collection>)> {
    let collection = state
        .services
        .catalog()
        .create_collection(&current_user.actor(), payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(collection)))
}

/// Create a course owned by the calling instructor
#[utoipa::path(
    post,
    path = "/courses",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid price"),
        (status = 403, description = "Only instructors can create courses"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn create_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = state
        .services
        .catalog()
        .create_course(&current_user.actor(), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Get a course with its derived aggregates
#[utoipa::path(
    get,
    path = "/courses/{course_id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> AppResult<Json<Course>> {
    let course = state.services.catalog().get_course(course_id).await?;
    Ok(Json(course))
}

/// Rating, enrollment and duration figures for the course owner
#[utoipa::path(
    get,
    path = "/courses/{course_id}/statistics",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course statistics", body = CourseStatistics),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_statistics(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> AppResult<Json<CourseStatistics>> {
    let stats = state
        .services
        .catalog()
        .statistics(&current_user.actor(), course_id)
        .await?;

    Ok(Json(stats))
}

/// List a course's sections in position order
#[utoipa::path(
    get,
    path = "/courses/{course_id}/sections",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Sections", body = Vec<Section>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn list_sections(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> AppResult<Json<Vec<Section>>> {
    let sections = state.services.catalog().list_sections(course_id).await?;
    Ok(Json(sections))
}

/// Append a section to a course
#[utoipa::path(
    post,
    path = "/courses/{course_id}/sections",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body = CreateSectionRequest,
    responses(
        (status = 201, description = "Section created", body = Section),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_section(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreateSectionRequest>,
) -> AppResult<(StatusCode, Json<Section>)> {
    let input = NewSection {
        title: payload.title,
        locked: payload.locked,
        is_default: payload.is_default,
    };
    let section = state
        .services
        .catalog()
        .create_section(&current_user.actor(), course_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

/// List a section's lessons (owner, admin or purchaser with the section unlocked)
#[utoipa::path(
    get,
    path = "/courses/{course_id}/sections/{section_id}/lessons",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Lessons in order", body = Vec<Lesson>),
        (status = 403, description = "Course not purchased or section locked"),
        (status = 404, description = "Course or section not found")
    )
)]
pub async fn list_lessons(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
) -> AppResult<Json<Vec<Lesson>>> {
    let lessons = state
        .services
        .catalog()
        .list_lessons(&current_user.actor(), course_id, section_id)
        .await?;

    Ok(Json(lessons))
}

/// Add a lesson; section and course totals are recomputed
#[utoipa::path(
    post,
    path = "/courses/{course_id}/sections/{section_id}/lessons",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Course or section not found")
    )
)]
pub async fn create_lesson(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
    ValidatedJson(payload): ValidatedJson<CreateLessonRequest>,
) -> AppResult<(StatusCode, Json<Lesson>)> {
    let input = NewLesson {
        title: payload.title,
        file: payload.file,
        duration: payload.duration,
        is_active: payload.is_active,
    };
    let lesson = state
        .services
        .catalog()
        .create_lesson(&current_user.actor(), course_id, section_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Update a lesson
#[utoipa::path(
    put,
    path = "/lessons/{lesson_id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn update_lesson(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateLessonRequest>,
) -> AppResult<Json<Lesson>> {
    let lesson = state
        .services
        .catalog()
        .update_lesson(&current_user.actor(), lesson_id, payload.into())
        .await?;

    Ok(Json(lesson))
}

/// Delete a lesson
#[utoipa::path(
    delete,
    path = "/lessons/{lesson_id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson deleted", body = MessageResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn delete_lesson(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .catalog()
        .delete_lesson(&current_user.actor(), lesson_id)
        .await?;

    Ok(Json(MessageResponse::new("Lesson deleted successfully")))
}

/// List a section's quiz questions
#[utoipa::path(
    get,
    path = "/courses/{course_id}/sections/{section_id}/questions",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Questions; correctness shown to owner and admins", body = Vec<QuestionView>),
        (status = 403, description = "Course not purchased or section locked")
    )
)]
pub async fn list_questions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
) -> AppResult<Json<Vec<QuestionView>>> {
    let questions = state
        .services
        .catalog()
        .list_questions(&current_user.actor(), course_id, section_id)
        .await?;

    Ok(Json(questions))
}

/// Add a quiz question with its options
#[utoipa::path(
    post,
    path = "/courses/{course_id}/sections/{section_id}/questions",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionView),
        (status = 400, description = "Fewer than two options or none correct"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn create_question(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
    ValidatedJson(payload): ValidatedJson<CreateQuestionRequest>,
) -> AppResult<(StatusCode, Json<QuestionView>)> {
    let question = state
        .services
        .catalog()
        .create_question(&current_user.actor(), course_id, section_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}
