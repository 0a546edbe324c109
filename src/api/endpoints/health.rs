//! Health check endpoint.

use axum::extract::State;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiResponse};

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

/// `GET /health`: liveness plus a trivial query against the store.
pub async fn check(State(ctx): State<ApiContext>) -> Result<ApiResponse<HealthResponse>, ApiError> {
    let database = ctx
        .core
        .with_db(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| ApiError::Internal(e.to_string()))
        })
        .is_ok();

    Ok(ApiResponse::success(
        HealthResponse {
            status: "ok",
            database,
            version: crate::config::APP_VERSION,
        },
        "Service is healthy",
    ))
}
