//! Scheme registry endpoints.
//!
//! - `GET /api/schemes`, `POST /api/schemes`
//! - `GET|PUT|DELETE /api/schemes/:name`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::scheme as repo;
use crate::models::Scheme;

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Scheme>>, ApiError> {
    let schemes = ctx
        .core
        .with_db(|conn| repo::list_schemes(conn).map_err(ApiError::from))?;
    Ok(Json(schemes))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<Json<Scheme>, ApiError> {
    let scheme = ctx
        .core
        .with_db(|conn| repo::get_scheme(conn, &name).map_err(ApiError::from))?
        .ok_or_else(|| ApiError::NotFound(format!("Scheme '{name}' not found")))?;
    Ok(Json(scheme))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Json(scheme): Json<Scheme>,
) -> Result<(StatusCode, Json<Scheme>), ApiError> {
    validate(&scheme)?;
    ctx.core
        .with_db(|conn| repo::insert_scheme(conn, &scheme).map_err(ApiError::from))?;
    tracing::info!(scheme = %scheme.scheme_name, "Scheme created");
    Ok((StatusCode::CREATED, Json(scheme)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
    Json(scheme): Json<Scheme>,
) -> Result<Json<Scheme>, ApiError> {
    validate(&scheme)?;
    ctx.core
        .with_db(|conn| repo::update_scheme(conn, &name, &scheme).map_err(ApiError::from))?;
    tracing::info!(scheme = %name, renamed_to = %scheme.scheme_name, "Scheme updated");
    Ok(Json(scheme))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.core
        .with_db(|conn| repo::delete_scheme(conn, &name).map_err(ApiError::from))?;
    tracing::info!(scheme = %name, "Scheme deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn validate(scheme: &Scheme) -> Result<(), ApiError> {
    if scheme.scheme_name.trim().is_empty() {
        return Err(ApiError::BadRequest("scheme_name is required".into()));
    }
    if scheme.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".into()));
    }
    Ok(())
}
