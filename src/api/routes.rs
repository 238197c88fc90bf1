//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    menu_admin_routes, menu_routes, order_routes, user_routes, user_sync_routes,
};
use super::middleware::{auth_middleware, rate_limit_checkout_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::Config;

/// Create the application router with all routes configured
pub fn create_router(state: AppState, config: &Config) -> Router {
    let auth = || middleware::from_fn_with_state(state.clone(), auth_middleware);
    let rate_limit = || middleware::from_fn_with_state(state.clone(), rate_limit_middleware);

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Profile sync needs only the caller header, the rest a persisted caller
        .nest(
            "/users",
            user_sync_routes()
                .merge(user_routes().route_layer(auth()))
                .route_layer(rate_limit()),
        )
        // Public menu reads, admin menu writes
        .nest(
            "/menu",
            menu_routes()
                .merge(menu_admin_routes().route_layer(auth()))
                .route_layer(rate_limit()),
        )
        // Orders (caller required, stricter limit on checkout)
        .nest(
            "/orders",
            order_routes()
                .route_layer(auth())
                .route_layer(rate_limit())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_checkout_middleware,
                )),
        )
        // Global middleware
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser front end. `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Root endpoint
async fn root() -> &'static str {
    "Restaurant Orders API"
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
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
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

/// Health check endpoint with database and Redis connectivity check.
///
/// Redis is optional: when it is not configured it reports `disabled` and
/// does not degrade the overall status.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = ServiceStatus::from_result(state.database.ping().await);

    let redis_status = match &state.cache {
        Some(cache) => ServiceStatus::from_result(cache.ping().await),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_from_result() {
        let ok = ServiceStatus::from_result::<String>(Ok(()));
        assert_eq!(ok.status, "healthy");
        assert!(ok.error.is_none());

        let failed = ServiceStatus::from_result(Err("connection refused"));
        assert_eq!(failed.status, "unhealthy");
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
    }
}
