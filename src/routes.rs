//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod auth;
mod students;
mod teachers;

use crate::auth::auth_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Roster routes require a bearer token
    let protected = Router::new()
        // Student routes
        .route("/api/students/search", post(students::search))
        .route("/api/students/count", post(students::count))
        .route("/api/students/search-individual", post(students::search_individual))
        .route("/api/students/{id}", get(students::get_student))
        .route("/api/students/{id}/detail", get(students::detail))
        .route("/api/students/search-by-program", get(students::search_by_program))
        .route("/api/students/dropdown-data", get(students::dropdown_data))
        .route(
            "/api/students/cascading-dropdown/{level}",
            get(students::cascading_dropdown),
        )
        .route("/api/students/diagnose-database", get(students::diagnose_database))

        // Teacher routes
        .route("/api/teachers", get(teachers::list_teachers))
        .route("/api/teachers/dropdown-data", get(teachers::dropdown_data))
        .route("/api/teachers/{id}", get(teachers::get_teacher))
        .route("/api/teachers/{id}/schedule", get(teachers::teacher_schedule))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Auth routes
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))

        .merge(protected)

        // Apply middleware and state
        .layer(middleware_stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
