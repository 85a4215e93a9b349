//! Course rating handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Rating;
use crate::errors::AppResult;
use crate::types::MessageResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatingRequest {
    /// Between 1 and 5
    #[schema(value_type = f64, example = 4.5)]
    pub score: Decimal,
}

/// Rating writes sit behind the stricter write limiter
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/courses/:course_id/ratings", post(rate_course))
        .route(
            "/courses/:course_id/ratings/:rating_id",
            put(update_rating).delete(delete_rating),
        )
}

/// Rate a purchased course
#[utoipa::path(
    post,
    path = "/courses/{course_id}/ratings",
    tag = "Ratings",
    security(("bearer_auth" = [])),
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body = RatingRequest,
    responses(
        (status = 201, description = "Rating created", body = Rating),
        (status = 400, description = "Not purchased, already rated or score out of range"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn rate_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<RatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state
        .services
        .ratings()
        .rate_course(&current_user.actor(), course_id, payload.score)
        .await?;

    Ok((StatusCode::CREATED, Json(rating)))
}

/// Change the caller's rating
#[utoipa::path(
    put,
    path = "/courses/{course_id}/ratings/{rating_id}",
    tag = "Ratings",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("rating_id" = i32, Path, description = "Rating ID")
    ),
    request_body = RatingRequest,
    responses(
        (status = 200, description = "Rating updated", body = Rating),
        (status = 403, description = "Not the caller's rating"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn update_rating(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, rating_id)): Path<(i32, i32)>,
    ValidatedJson(payload): ValidatedJson<RatingRequest>,
) -> AppResult<Json<Rating>> {
    let rating = state
        .services
        .ratings()
        .update_rating(&current_user.actor(), course_id, rating_id, payload.score)
        .await?;

    Ok(Json(rating))
}

/// Withdraw the caller's rating
#[utoipa::path(
    delete,
    path = "/courses/{course_id}/ratings/{rating_id}",
    tag = "Ratings",
    security(("bearer_auth" = [])),
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("rating_id" = i32, Path, description = "Rating ID")
    ),
    responses(
        (status = 200, description = "Rating deleted", body = MessageResponse),
        (status = 403, description = "Not the caller's rating"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn delete_rating(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((course_id, rating_id)): Path<(i32, i32)>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .ratings()
        .delete_rating(&current_user.actor(), course_id, rating_id)
        .await?;

    Ok(Json(MessageResponse::new("Rating deleted successfully")))
}
