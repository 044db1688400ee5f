//! Administrative endpoints. Mounted behind the admin middleware.
//!
//! - `GET /api/admin/investors` — archived investors, newest first
//! - `GET /api/admin/investors/:id` — one archived record in full
//! - `GET /api/admin/export` — the investor listing as CSV
//! - `GET /api/admin/stats` — dashboard aggregates
//! - `POST /api/admin/sessions/:session_id/funds/review` — resolve a
//!   pending proof-of-funds stage

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::api::endpoints::verifications::parse_session_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, FundsReviewRequest, StageResponse};
use crate::db::repository::archive::{self, ArchiveStats, ArchivedSummary};
use crate::models::ArchivedRecord;
use crate::verification::accreditation::format_usd;
use crate::verification::{compute_overall_status, resolve_pending_funds};

const CSV_HEADER: [&str; 9] = [
    "ID",
    "Name",
    "Country",
    "KYC",
    "Accredited",
    "AML",
    "Funds",
    "Investment",
    "Completion Date",
];

pub async fn list_investors(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<ArchivedSummary>>, ApiError> {
    let investors = ctx
        .core
        .with_db(|conn| archive::list_archived(conn).map_err(ApiError::from))?;
    Ok(Json(investors))
}

pub async fn investor_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ArchivedRecord>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid investor id: {id}")))?;
    let record = ctx
        .core
        .with_db(|conn| archive::get_archived(conn, &id).map_err(ApiError::from))?
        .ok_or_else(|| ApiError::NotFound(format!("Investor {id} not found")))?;
    Ok(Json(record))
}

/// Download of the admin listing, same rows and order as `list_investors`.
pub async fn export_investors(State(ctx): State<ApiContext>) -> Result<impl IntoResponse, ApiError> {
    let investors = ctx
        .core
        .with_db(|conn| archive::list_archived(conn).map_err(ApiError::from))?;
    tracing::info!(rows = investors.len(), "Admin exported investor data");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"investor_data.csv\"",
            ),
        ],
        investors_csv(&investors),
    ))
}

fn investors_csv(investors: &[ArchivedSummary]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));
    for investor in investors {
        push_csv_row(
            &mut out,
            [
                investor.id.to_string(),
                investor.full_name.clone(),
                investor.country.clone(),
                investor.kyc_status.to_string(),
                investor.accreditation_status.to_string(),
                investor.aml_status.to_string(),
                investor.funds_status.to_string(),
                format_usd(investor.investment_amount),
                investor.completed_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ],
        );
    }
    out
}

fn push_csv_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&field);
        }
    }
    out.push_str("\r\n");
}

pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<ArchiveStats>, ApiError> {
    let stats = ctx
        .core
        .with_db(|conn| archive::archive_stats(conn).map_err(ApiError::from))?;
    Ok(Json(stats))
}

/// Approving promotes the stage to `verified`; rejecting makes it
/// `rejected`. The outcome is returned as-is, not as a policy error.
pub async fn review_funds(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
    Json(req): Json<FundsReviewRequest>,
) -> Result<Json<StageResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let (result, stages, overall_status) =
        ctx.core
            .with_session(&session_id, |record| -> Result<_, ApiError> {
                let result = resolve_pending_funds(record, req.decision)?;
                Ok((result, record.stages.clone(), compute_overall_status(record)))
            })?;

    tracing::info!(%session_id, decision = %req.decision, "Admin reviewed pending funds");

    Ok(Json(StageResponse {
        session_id,
        result,
        stages,
        overall_status,
    }))
}
