//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Audit logger → 3. Cache-Control (admin only)
//!    → 4. Admin validator (admin only)

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::storage::MAX_UPLOAD_BYTES;

/// Multipart framing overhead allowed on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/verifications", post(endpoints::verifications::start))
        .route(
            "/verifications/:session_id",
            get(endpoints::verifications::status),
        )
        .route(
            "/verifications/:session_id/restart",
            post(endpoints::verifications::restart),
        )
        .route(
            "/verifications/:session_id/kyc",
            post(endpoints::verifications::kyc),
        )
        .route(
            "/verifications/:session_id/accreditation",
            post(endpoints::verifications::accreditation),
        )
        .route(
            "/verifications/:session_id/aml",
            post(endpoints::verifications::aml),
        )
        .route(
            "/verifications/:session_id/funds",
            post(endpoints::verifications::funds),
        )
        .route(
            "/verifications/:session_id/finalize",
            post(endpoints::verifications::finalize),
        )
        .route(
            "/uploads/:kind",
            post(endpoints::uploads::upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
        .route(
            "/schemes",
            get(endpoints::schemes::list).post(endpoints::schemes::create),
        )
        .route(
            "/schemes/:name",
            get(endpoints::schemes::detail)
                .put(endpoints::schemes::update)
                .delete(endpoints::schemes::delete),
        )
        .with_state(ctx.clone());

    // Admin routes: bearer token required, responses never cached.
    let admin = Router::new()
        .route("/admin/investors", get(endpoints::admin::list_investors))
        .route(
            "/admin/investors/:id",
            get(endpoints::admin::investor_detail),
        )
        .route("/admin/export", get(endpoints::admin::export_investors))
        .route("/admin/stats", get(endpoints::admin::stats))
        .route(
            "/admin/sessions/:session_id/funds/review",
            post(endpoints::admin::review_funds),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::admin::require_admin))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .nest("/api", public.merge(admin))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx))
}
