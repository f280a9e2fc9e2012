// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, chapter, leaderboard, mcq, performance, preferences, result, subject},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Every group except register/login and the health check requires a token.
/// * Admin-only routes are layered with `admin_middleware` inside `auth_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route(
                    "/profile",
                    get(auth::get_profile).put(auth::update_profile),
                )
                .layer(auth_layer.clone()),
        );

    let subject_routes = Router::new()
        .route("/", get(subject::list_subjects))
        .layer(auth_layer.clone())
        .merge(
            Router::new()
                .route("/", post(subject::create_subject))
                .route("/{id}", delete(subject::delete_subject))
                .layer(middleware::from_fn(admin_middleware))
                .layer(auth_layer.clone()),
        );

    let chapter_routes = Router::new()
        .route("/{id}", get(chapter::list_chapters))
        .route("/{id}/test-config", get(chapter::get_test_config))
        .layer(auth_layer.clone())
        .merge(
            Router::new()
                .route("/", post(chapter::create_chapter))
                .route("/{id}", delete(chapter::delete_chapter))
                .route("/{id}/test-config", put(chapter::update_test_config))
                .layer(middleware::from_fn(admin_middleware))
                .layer(auth_layer.clone()),
        );

    let mcq_routes = Router::new()
        .route("/{id}", get(mcq::list_mcqs_for_student))
        .route("/{id}/check-attempt", get(mcq::check_attempt))
        .route("/{id}/submit", post(mcq::submit_answers))
        .layer(auth_layer.clone())
        .merge(
            Router::new()
                .route("/", post(mcq::create_mcq))
                .route("/admin/{id}", get(mcq::list_mcqs_admin))
                .route("/{id}", put(mcq::update_mcq).delete(mcq::delete_mcq))
                .layer(middleware::from_fn(admin_middleware))
                .layer(auth_layer.clone()),
        );

    let result_routes = Router::new()
        .route("/my", get(result::my_results))
        .layer(auth_layer.clone())
        .merge(
            Router::new()
                .route("/analytics", get(result::analytics))
                .layer(middleware::from_fn(admin_middleware))
                .layer(auth_layer.clone()),
        );

    let performance_routes = Router::new()
        .route("/insights", get(performance::insights))
        .route("/recommendations", get(performance::recommendations))
        .layer(auth_layer.clone());

    let leaderboard_routes = Router::new()
        .route("/", get(leaderboard::get_leaderboard))
        .layer(auth_layer.clone())
        .merge(
            Router::new()
                .route("/update-rankings", post(leaderboard::update_rankings))
                .layer(middleware::from_fn(admin_middleware))
                .layer(auth_layer.clone()),
        );

    let preference_routes = Router::new()
        .route(
            "/",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .route("/students", get(admin::list_students))
        .route("/students/{id}", get(admin::student_details))
        .route("/students/{id}/status", put(admin::update_student_status))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth_layer);

    Router::new()
        .route("/", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/chapters", chapter_routes)
        .nest("/api/mcqs", mcq_routes)
        .nest("/api/results", result_routes)
        .nest("/api/performance", performance_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/preferences", preference_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "message": "MCQ practice API",
        "status": "ok",
    }))
}
