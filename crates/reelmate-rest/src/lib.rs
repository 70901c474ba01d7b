pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use reelmate_core::service::ReelmateEngine;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Construct the full Axum router for the Reelmate REST API.
///
/// The router carries `Arc<ReelmateEngine>` as shared state.
///
/// CORS is restrictive by default (localhost only). Set the
/// `REELMATE_CORS_ORIGINS` environment variable to a comma-separated
/// list of allowed origins to override (e.g. `https://app.example.com`).
/// Set it to `*` to allow all origins (not recommended for production).
pub fn router(engine: Arc<ReelmateEngine>) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .route(
            "/users",
            post(handlers::create_user_handler)
                .put(handlers::update_user_handler)
                .get(handlers::list_users_handler),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user_handler).delete(handlers::delete_user_handler),
        )
        .route(
            "/users/{id}/friends/{friend_id}",
            put(handlers::add_friend_handler).delete(handlers::remove_friend_handler),
        )
        .route("/users/{id}/friends", get(handlers::list_friends_handler))
        .route(
            "/users/{id}/friends/common/{other_id}",
            get(handlers::common_friends_handler),
        )
        .route("/mpa", get(handlers::list_mpa_handler))
        .route("/mpa/{id}", get(handlers::get_mpa_handler))
        .route("/health", get(handlers::health_handler))
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB max request body
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(engine)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{HeaderName, Method};

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    match std::env::var("REELMATE_CORS_ORIGINS") {
        Ok(val) if val == "*" => base.allow_origin(AllowOrigin::any()),
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            base.allow_origin(origins)
        }
        Err(_) => {
            // Default: localhost only
            let origins: Vec<_> = [
                "http://localhost:3000",
                "http://localhost:8080",
                "http://127.0.0.1:3000",
                "http://127.0.0.1:8080",
            ]
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
            base.allow_origin(origins)
        }
    }
}
