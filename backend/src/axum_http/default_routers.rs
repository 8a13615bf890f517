use axum::{http::StatusCode, response::IntoResponse};
use tracing::info;

use super::error_responses::json_error;

pub async fn not_found() -> impl IntoResponse {
    info!("backend router: not_found handler invoked");
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND")
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
