//! Lesson completion and course progress handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::CourseProgress;
use crate::errors::AppResult;
use crate::services::LessonSnapshot;

/// Create progress routes
pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/lessons/:lesson_id/mark_as_finished", put(mark_as_finished))
        .route("/lessons/:lesson_id/mark_as_unfinished", put(mark_as_unfinished))
        .route("/courses/:course_id/progress", get(get_progress))
}

/// Mark a lesson as finished
#[utoipa::path(
    put,
    path = "/lessons/{lesson_id}/mark_as_finished",
    tag = "Progress",
    security(("bearer_auth" = [])),
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson snapshot", body = LessonSnapshot),
        (status = 403, description = "Course not purchased"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn mark_as_finished(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> AppResult<Json<LessonSnapshot>> {
    let snapshot = state
        .services
        .progress()
        .set_lesson_completion(&current_user.actor(), lesson_id, true)
        .await?;

    Ok(Json(snapshot))
}

/// Mark a lesson as not finished
#[utoipa::path(
    put,
    path = "/lessons/{lesson_id}/mark_as_unfinished",
    tag = "Progress",
    security(("bearer_auth" = [])),
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson snapshot", body = LessonSnapshot),
        (status = 403, description = "Course not purchased"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn mark_as_unfinished(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> AppResult<Json<LessonSnapshot>> {
    let snapshot = state
        .services
        .progress()
        .set_lesson_completion(&current_user.actor(), lesson_id, false)
        .await?;

    Ok(Json(snapshot))
}

/// Get the caller's progress through a purchased course
#[utoipa::path(
    get,
    path = "/courses/{course_id}/progress",
    tag = "Progress",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course progress", body = CourseProgress),
        (status = 403, description = "Course not purchased"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_progress(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> AppResult<Json<CourseProgress>> {
    let progress = state
        .services
        .progress()
        .get_progress(&current_user.actor(), course_id)
        .await?;

    Ok(Json(progress))
}
