// src/presentation/http/routes.rs
use crate::config::{AppConfig, Environment};
use crate::infrastructure::database;
use crate::presentation::http::{
    error::{HttpError, HttpResult, TransportError},
    extractors::ApiJson,
    middleware::{process_time, request_context},
    openapi::{self, HealthResponse},
    state::HttpState,
};
use axum::{
    Extension, Router,
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::get,
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Router-wide options derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub project_name: String,
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
}

impl From<&AppConfig> for RouterSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            project_name: config.project_name().to_string(),
            environment: config.environment(),
            allowed_origins: config.allowed_origins().to_vec(),
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            project_name: "crud-scaffold".into(),
            environment: Environment::Production,
            allowed_origins: vec!["*".into()],
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// Builds the application router. `api` carries the entity routers (usually
/// [`crud_router`](super::controllers::crud_router)s nested under their paths).
pub fn build_router(state: HttpState, settings: &RouterSettings, api: Router) -> Router {
    let mut router = Router::new()
        .route("/health-check", get(health_check))
        .route("/health-check/database", get(database_health_check))
        .merge(api);

    if !settings.environment.is_production() {
        router = router.merge(openapi::docs_router(&settings.project_name));
    }

    router = router
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(Extension(state));

    if settings.environment.is_local() {
        router = router.layer(from_fn(process_time));
    }

    router
        .layer(from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.allowed_origins))
}

async fn not_found() -> HttpError {
    HttpError::from(TransportError::not_found())
}

async fn method_not_allowed() -> HttpError {
    HttpError::from(TransportError::method_not_allowed())
}

#[utoipa::path(
    get,
    path = "/health-check",
    responses(
        (status = 200, description = "Service health check.", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> ApiJson<HealthResponse> {
    ApiJson(HealthResponse::success())
}

#[utoipa::path(
    get,
    path = "/health-check/database",
    responses(
        (status = 200, description = "The database answered a round trip.", body = HealthResponse),
        (status = 500, description = "The database could not be reached.", body = crate::presentation::http::response::ErrorEnvelope)
    ),
    tag = "System"
)]
pub async fn database_health_check(
    Extension(state): Extension<HttpState>,
) -> HttpResult<ApiJson<HealthResponse>> {
    database::ping(&state.db_pool).await?;
    Ok(ApiJson(HealthResponse::success()))
}
