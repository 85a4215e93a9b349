//! Instructor handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::EarningsReport;
use crate::errors::AppResult;

/// Create instructor routes
pub fn instructor_routes() -> Router<AppState> {
    Router::new().route("/instructors/:instructor_id/earnings", get(get_earnings))
}

/// Earnings after the platform deduction (the instructor themself or an admin)
#[utoipa::path(
    get,
    path = "/instructors/{instructor_id}/earnings",
    tag = "Instructors",
    security(("bearer_auth" = [])),
    params(("instructor_id" = Uuid, Path, description = "Instructor user ID")),
    responses(
        (status = 200, description = "Earnings report", body = EarningsReport),
        (status = 403, description = "Not this instructor"),
        (status = 404, description = "Instructor not found")
    )
)]
pub async fn get_earnings(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
) -> AppResult<Json<EarningsReport>> {
    let report = state
        .services
        .earnings()
        .get_earnings(&current_user.actor(), instructor_id)
        .await?;

    Ok(Json(report))
}
