//! Cart handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::CartSnapshot;
use crate::errors::AppResult;

/// Add-to-cart request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddItemRequest {
    #[schema(example = 1)]
    pub course_id: Option<i32>,
}

/// Create cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/carts/me", get(get_cart))
        .route("/carts/:cart_id/add-item", post(add_item))
        .route("/carts/:cart_id/items/:item_id", delete(remove_item))
}

/// Get the caller's cart, creating it on first use
#[utoipa::path(
    get,
    path = "/carts/me",
    tag = "Carts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart snapshot", body = CartSnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrators have no cart")
    )
)]
pub async fn get_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state.services.carts().get_cart(&current_user.actor()).await?;
    Ok(Json(cart))
}

/// Add a course to the cart
#[utoipa::path(
    post,
    path = "/carts/{cart_id}/add-item",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(("cart_id" = Uuid, Path, description = "Cart ID")),
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Course added", body = CartSnapshot),
        (status = 400, description = "course_id missing or course already in the cart"),
        (status = 404, description = "Unknown cart or course")
    )
)]
pub async fn add_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddItemRequest>,
) -> AppResult<(StatusCode, Json<CartSnapshot>)> {
    let cart = state
        .services
        .carts()
        .add_item(&current_user.actor(), cart_id, payload.course_id)
        .await?;

    Ok((StatusCode::CREATED, Json(cart)))
}

/// Remove an item from the cart
#[utoipa::path(
    delete,
    path = "/carts/{cart_id}/items/{item_id}",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = i32, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = CartSnapshot),
        (status = 404, description = "Item not found in cart")
    )
)]
pub async fn remove_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, i32)>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state
        .services
        .carts()
        .remove_item(&current_user.actor(), cart_id, item_id)
        .await?;

    Ok(Json(cart))
}
