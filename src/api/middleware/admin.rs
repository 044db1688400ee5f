//! Admin bearer token middleware.
//!
//! Extracts `Authorization: Bearer <token>` and asks the configured
//! `AdminAuthenticator`. On success the response is marked with
//! `AdminContext` for the audit log.

use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{AdminContext, ApiContext};

pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_admin_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_admin_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let admin = ctx.core.admin();
    if !admin.enabled() {
        return Err(ApiError::AdminDisabled);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if !admin.authenticate(token) {
        tracing::warn!(path = %req.uri().path(), "Admin authentication failed");
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AdminContext);

    let mut response = next.run(req).await;
    response.extensions_mut().insert(AdminContext);

    Ok(response)
}
