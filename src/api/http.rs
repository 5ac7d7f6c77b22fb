//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::rest::statements;
use super::state::AppState;
use crate::types::XAPI_VERSION;

/// Path of the statements resource
pub const STATEMENTS_PATH: &str = "/xAPI/statements";

const VERSION_HEADER: HeaderName = HeaderName::from_static("x-experience-api-version");

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route(
            STATEMENTS_PATH,
            get(statements::get_statements).post(statements::post_statements),
        )
        .route("/xAPI/statements/", post(statements::post_statements))
        .layer(middleware::map_response(with_version_header))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn with_version_header(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static(XAPI_VERSION));
    response
}
