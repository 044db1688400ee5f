//! Document upload endpoint.
//!
//! `POST /api/uploads/:kind` — multipart form with a single `file` field.
//! `kind` is one of `ids`, `selfies`, `documents`. Returns the blob handle
//! to reference from a later stage submission.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UploadResponse};
use crate::models::UploadKind;

pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let kind: UploadKind = kind
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown upload kind: {kind}")))?;

    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {e}");
            ApiError::BadRequest("Failed to read file data".into())
        })?;
        file_data = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) =
        file_data.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;

    let handle = ctx.core.blobs().put(kind, &filename, &bytes)?;

    tracing::info!(kind = %kind, size = bytes.len(), "Document uploaded");

    Ok((StatusCode::CREATED, Json(UploadResponse { kind, handle })))
}
