//! Quiz handlers: answers, retake and status.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::QuizStatus;
use crate::errors::AppResult;
use crate::services::{AnswerInput, AnswerOutcome, QuizResult, RetakeOutcome};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAnswerRequest {
    #[schema(example = 3)]
    pub option_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAllAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

/// Create quiz routes
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/:course_id/sections/:section_id/questions/answer-all",
            post(submit_all_answers),
        )
        .route(
            "/courses/:course_id/sections/:section_id/questions/retake",
            get(retake),
        )
        .route(
            "/courses/:course_id/sections/:section_id/questions/status",
            get(quiz_status),
        )
        .route(
            "/courses/:course_id/sections/:section_id/questions/:question_id/answer",
            post(submit_answer),
        )
}

/// Answer one question and get the updated section score
#[utoipa::path(
    post,
    path = "/courses/{course_id}/sections/{section_id}/questions/{question_id}/answer",
    tag = "Quiz",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID"),
        ("question_id" = i32, Path, description = "Question ID")
    ),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerOutcome),
        (status = 400, description = "Option belongs to another question"),
        (status = 403, description = "Course not purchased or section locked"),
        (status = 404, description = "Question or option not found")
    )
)]
pub async fn submit_answer(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id, question_id)): Path<(i32, i32, i32)>,
    ValidatedJson(payload): ValidatedJson<SubmitAnswerRequest>,
) -> AppResult<Json<AnswerOutcome>> {
    let outcome = state
        .services
        .quiz()
        .submit_answer(
            &current_user.actor(),
            course_id,
            section_id,
            question_id,
            payload.option_id,
        )
        .await?;

    Ok(Json(outcome))
}

/// Submit every answer of a section in one batch
#[utoipa::path(
    post,
    path = "/courses/{course_id}/sections/{section_id}/questions/answer-all",
    tag = "Quiz",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    request_body = SubmitAllAnswersRequest,
    responses(
        (status = 200, description = "Section scored", body = QuizResult),
        (status = 400, description = "An answer lacks question_id or option_id"),
        (status = 403, description = "Course not purchased or section locked"),
        (status = 404, description = "Question or option not in this section")
    )
)]
pub async fn submit_all_answers(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
    ValidatedJson(payload): ValidatedJson<SubmitAllAnswersRequest>,
) -> AppResult<Json<QuizResult>> {
    let result = state
        .services
        .quiz()
        .submit_all_answers(&current_user.actor(), course_id, section_id, payload.answers)
        .await?;

    Ok(Json(result))
}

/// Reset the section quiz and start a new attempt
#[utoipa::path(
    get,
    path = "/courses/{course_id}/sections/{section_id}/questions/retake",
    tag = "Quiz",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Quiz reset", body = RetakeOutcome),
        (status = 403, description = "Course not purchased or section locked")
    )
)]
pub async fn retake(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
) -> AppResult<Json<RetakeOutcome>> {
    let outcome = state
        .services
        .quiz()
        .retake(&current_user.actor(), course_id, section_id)
        .await?;

    Ok(Json(outcome))
}

/// Current quiz state for the caller
#[utoipa::path(
    get,
    path = "/courses/{course_id}/sections/{section_id}/questions/status",
    tag = "Quiz",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("section_id" = i32, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Quiz status", body = QuizStatus),
        (status = 403, description = "Course not purchased or section locked")
    )
)]
pub async fn quiz_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(i32, i32)>,
) -> AppResult<Json<QuizStatus>> {
    let status = state
        .services
        .quiz()
        .status(&current_user.actor(), course_id, section_id)
        .await?;

    Ok(Json(status))
}
