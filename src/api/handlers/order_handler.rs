//! Order handlers: checkout, listing and settlement.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{OrderSnapshot, PaymentStatus};
use crate::errors::{AppError, AppResult};
use crate::infra::checkout_lock_resource;
use crate::types::{Paginated, PaginationParams};

/// Settlement request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettleOrderRequest {
    /// `complete` or `failed`
    pub status: PaymentStatus,
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:order_id/payment-status", put(settle_order))
}

/// Checkout sits behind the stricter write limiter
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/orders/checkout", post(checkout))
}

/// Convert the caller's cart into an order
#[utoipa::path(
    post,
    path = "/orders/checkout",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order placed", body = OrderSnapshot),
        (status = 400, description = "Cart is empty or a course was already purchased"),
        (status = 403, description = "Administrators cannot buy courses")
    )
)]
pub async fn checkout(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<OrderSnapshot>)> {
    let lock = match state.cache.as_ref() {
        Some(cache) => {
            let resource = checkout_lock_resource(&current_user.id.to_string());
            match cache.try_acquire_lock(&resource).await? {
                Some(guard) => Some(guard),
                None => return Err(AppError::conflict("A checkout is already in progress")),
            }
        }
        None => None,
    };

    let result = state.services.checkout().checkout(&current_user.actor()).await;

    if let Some(guard) = lock {
        if let Err(e) = guard.release().await {
            tracing::warn!(error = %e, "Failed to release checkout lock");
        }
    }

    Ok((StatusCode::CREATED, Json(result?)))
}

/// List the caller's orders
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Orders with their items", body = Vec<OrderSnapshot>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<OrderSnapshot>>> {
    let (orders, total) = state
        .services
        .checkout()
        .list_orders(&current_user.actor(), params.clone())
        .await?;

    Ok(Json(Paginated::new(orders, &params, total)))
}

/// Settle a pending order (admin only)
#[utoipa::path(
    put,
    path = "/orders/{order_id}/payment-status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = i32, Path, description = "Order ID")),
    request_body = SettleOrderRequest,
    responses(
        (status = 200, description = "Order settled", body = OrderSnapshot),
        (status = 400, description = "Order already settled"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn settle_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<SettleOrderRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    require_admin(&current_user)?;
    let order = state
        .services
        .checkout()
        .settle_order(&current_user.actor(), order_id, payload.status)
        .await?;

    Ok(Json(order))
}
