pub mod recommendation_task;
pub mod refresh_task;
pub mod rest;
pub mod state;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API router over the shared state.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/content",
            get(rest::list_content_handler).post(rest::create_content_handler),
        )
        .route("/content/{id}", get(rest::get_content_handler))
        .route("/dashboard", get(rest::get_dashboard_handler))
        .route("/dashboard/refresh", post(rest::refresh_dashboard_handler))
        .route("/recommendations", post(rest::create_recommendation_handler))
        .route(
            "/recommendations/latest",
            get(rest::latest_recommendation_handler),
        )
        .with_state(app_state)
}

/// CORS for the browser dashboard served from `allowed_origin`.
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
