//! Verification session endpoints.
//!
//! - `POST /api/verifications` — start a session
//! - `GET /api/verifications/:session_id` — current record and status
//! - `POST /api/verifications/:session_id/restart` — discard and start over
//! - `POST /api/verifications/:session_id/{kyc,accreditation,aml,funds}`
//! - `POST /api/verifications/:session_id/finalize` — archive a complete record
//!
//! A rejected or flagged stage is persisted on the record first and then
//! reported as `422 POLICY_REJECTED`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::*;
use crate::models::InvestorRecord;
use crate::verification::{
    compute_overall_status, finalize_verification, restart_verification, AccreditationInput,
    AmlInput, StageResult, VerificationError, VerificationPipeline,
};

/// `POST /api/verifications`
pub async fn start(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (session_id, record) = ctx.core.start_session()?;
    Ok((StatusCode::CREATED, Json(SessionResponse::new(session_id, record))))
}

/// `GET /api/verifications/:session_id`
pub async fn status(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let record = ctx.core.session_snapshot(&session_id)?;
    Ok(Json(SessionResponse::new(session_id, record)))
}

/// `POST /api/verifications/:session_id/restart`
pub async fn restart(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let record = ctx
        .core
        .with_session(&session_id, |record| -> Result<InvestorRecord, ApiError> {
            restart_verification(record);
            Ok(record.clone())
        })?;
    Ok(Json(SessionResponse::new(session_id, record)))
}

/// `POST /api/verifications/:session_id/kyc`
pub async fn kyc(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
    Json(req): Json<KycRequest>,
) -> Result<Json<StageResponse>, ApiError> {
    run_stage(&ctx, &session_id, |pipeline, record| {
        pipeline.submit_kyc(record, req.personal, req.id, req.documents)
    })
}

/// `POST /api/verifications/:session_id/accreditation`
pub async fn accreditation(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
    Json(input): Json<AccreditationInput>,
) -> Result<Json<StageResponse>, ApiError> {
    run_stage(&ctx, &session_id, |pipeline, record| {
        pipeline.submit_accreditation(record, input)
    })
}

/// `POST /api/verifications/:session_id/aml`
pub async fn aml(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
    Json(input): Json<AmlInput>,
) -> Result<Json<StageResponse>, ApiError> {
    run_stage(&ctx, &session_id, |pipeline, record| {
        pipeline.submit_aml(record, input)
    })
}

/// `POST /api/verifications/:session_id/funds`
pub async fn funds(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
    Json(req): Json<FundsRequest>,
) -> Result<Json<StageResponse>, ApiError> {
    run_stage(&ctx, &session_id, |pipeline, record| {
        pipeline.submit_funds(record, req.into())
    })
}

/// `POST /api/verifications/:session_id/finalize`
pub async fn finalize(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let (archived, next_record) = ctx.core.with_session_and_db(
        &session_id,
        |record, conn| -> Result<_, ApiError> {
            let archived = finalize_verification(conn, record)?;
            Ok((archived, record.clone()))
        },
    )?;

    Ok(Json(FinalizeResponse {
        session_id,
        archived_id: archived.record.id,
        completed_at: archived.completed_at,
        next_record,
    }))
}

// ── Helpers ─────────────────────────────────────────────────

pub(crate) fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {raw}")))
}

/// Evaluate one stage under the session lock, then surface a
/// rejected/flagged outcome as an error. The record keeps the outcome.
fn run_stage(
    ctx: &ApiContext,
    session_id: &str,
    submit: impl FnOnce(&VerificationPipeline, &mut InvestorRecord) -> Result<StageResult, VerificationError>,
) -> Result<Json<StageResponse>, ApiError> {
    let session_id = parse_session_id(session_id)?;
    let pipeline = ctx.core.pipeline();

    let (result, stages, overall_status) =
        ctx.core
            .with_session(&session_id, |record| -> Result<_, ApiError> {
                let result = submit(pipeline, record)?;
                Ok((result, record.stages.clone(), compute_overall_status(record)))
            })?;

    let result = result.ensure_passed()?;

    Ok(Json(StageResponse {
        session_id,
        result,
        stages,
        overall_status,
    }))
}
