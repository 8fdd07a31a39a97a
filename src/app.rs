use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::{AppConfig, RateLimitConfig};
use crate::db::repository::ArticleRepository;
use crate::error::AppError;

/// Shared application state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub article_repo: Arc<dyn ArticleRepository>,
}

impl AppState {
    pub fn new(article_repo: Arc<dyn ArticleRepository>) -> Self {
        Self { article_repo }
    }
}

/// Build the API router with tracing, CORS and the run-script rate limit.
pub fn build_router(state: AppState, config: &AppConfig) -> Result<Router, AppError> {
    let scripts = script_routes(&config.rate_limit)?;

    let cors = if config.server.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/api/search", get(api::search::search_handler))
        .route(
            "/api/search-suggestions",
            get(api::search::suggestions_handler),
        )
        .route(
            "/api/knowledge-base",
            get(api::knowledge_base::list_handler),
        )
        .route(
            "/api/knowledge-base/{id}",
            get(api::knowledge_base::article_handler),
        )
        .route("/api/dashboard", get(api::dashboard::dashboard_handler))
        .route(
            "/api/submit-feedback",
            post(api::feedback::submit_feedback_handler),
        )
        .merge(scripts)
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

fn script_routes(rate_limit: &RateLimitConfig) -> Result<Router<AppState>, AppError> {
    let routes = Router::new().route(
        "/api/run-script/{name}",
        post(api::scripts::run_script_handler),
    );

    if !rate_limit.enabled {
        return Ok(routes);
    }

    // Clients are keyed by forwarding headers first, then the peer address.
    let governor = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_millisecond(60_000 / u64::from(rate_limit.per_minute.max(1)))
        .burst_size(rate_limit.burst)
        .finish()
        .ok_or_else(|| AppError::Config("Invalid rate limit settings".into()))?;

    Ok(routes.layer(GovernorLayer::new(Arc::new(governor)).error_handler(rate_limit_response)))
}

/// JSON body for requests rejected by the rate limiter, keeping its `retry-after` headers.
fn rate_limit_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::RateLimited {
                retry_after_secs: wait_time,
            }
            .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        other => AppError::Internal(format!("Rate limiter failed: {other}")).into_response(),
    }
}

async fn not_found_handler() -> AppError {
    AppError::NotFound("Endpoint not found".into())
}

async fn method_not_allowed_handler() -> Response {
    let body = json!({ "error": "Method not allowed" });
    (axum::http::StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}

/// `GET /`: API name, version and endpoint index.
pub async fn index_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "iOS Enterprise Support Portal API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/search": "Search knowledge base articles",
            "/api/search-suggestions": "Autocomplete suggestions for a partial query",
            "/api/knowledge-base": "List or filter knowledge base articles",
            "/api/knowledge-base/{id}": "Get a single article",
            "/api/run-script/{name}": "Run automation scripts",
            "/api/dashboard": "Get analytics dashboard data",
            "/api/submit-feedback": "Submit user feedback"
        }
    }))
}
