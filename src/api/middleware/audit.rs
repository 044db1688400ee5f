//! Audit logging middleware.
//!
//! Logs every API request with method, path, response status, latency
//! and whether it was served through the admin surface. Request bodies
//! are never logged.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::AdminContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let admin = response.extensions().get::<AdminContext>().is_some();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status >= 500 {
        tracing::error!(%method, %path, status, elapsed_ms, admin, "API request failed");
    } else {
        tracing::info!(%method, %path, status, elapsed_ms, admin, "API request");
    }

    response
}
