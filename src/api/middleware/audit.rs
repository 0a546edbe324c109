//! Audit logging middleware.
//!
//! Tags every request with a UUID and logs method, path, user id and
//! response status. Runs innermost (after auth has injected `UserContext`).

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{RequestId, UserContext};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn log_access(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_id = req.extensions().get::<UserContext>().map(|u| u.user_id);
    req.extensions_mut().insert(RequestId(request_id));

    let started = Instant::now();
    let mut response = next.run(req).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%request_id, %method, %path, ?user_id, status, elapsed_ms, "API access");
    } else {
        tracing::info!(%request_id, %method, %path, ?user_id, status, elapsed_ms, "API access");
    }

    if let Ok(val) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    response
}
