pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::ocr::handlers::{handle_ocr, OCR_BODY_LIMIT};
use crate::render::{page::handle_index, report::handle_render};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analyze))
        .route("/api/v1/analysis/render", post(handle_render))
        .route(
            "/api/v1/summary/korean",
            post(handlers::handle_korean_summary),
        )
        .route(
            "/api/v1/summary/overall",
            post(handlers::handle_overall_summary),
        )
        .route("/api/v1/essays/example", get(handlers::handle_example_essay))
        .route("/api/v1/limits", get(handlers::handle_limits))
        // OCR API
        .route(
            "/api/v1/ocr",
            post(handle_ocr).layer(DefaultBodyLimit::max(OCR_BODY_LIMIT)),
        )
        .with_state(state)
}
