//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    cart_routes, catalog_routes, checkout_routes, instructor_routes, order_routes,
    progress_routes, quiz_routes, rating_routes,
};
use super::middleware::{auth_middleware, rate_limit_middleware, rate_limit_write_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Checkout and rating writes get the per-user write limit on top
    let writes = checkout_routes()
        .merge(rating_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_write_middleware,
        ));

    // Protected routes (require JWT + general rate limiting)
    let protected = Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(quiz_routes())
        .merge(progress_routes())
        .merge(instructor_routes())
        .merge(writes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Course Engine"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(result: Result<impl Sized, E>) -> Self {
        match result {
            Ok(_) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = ServiceStatus::from_check(state.database.ping().await);

    // Redis is optional; without it rate limiting and the checkout lock are off
    let redis_status = match state.cache.as_ref() {
        Some(cache) => ServiceStatus::from_check(cache.exists("health:ping").await),
        None => ServiceStatus {
            status: "disabled",
            error: None,
        },
    };

    let all_healthy = db_status.status == "healthy" && redis_status.status != "unhealthy";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
