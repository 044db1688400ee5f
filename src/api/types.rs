//! Shared types for the HTTP API layer.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::core_state::CoreState;
use crate::models::*;
use crate::verification::{
    compute_overall_status, FundsInput, IdInfo, KycDocuments, PersonalInfo, StageResult,
};

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Marker injected by the admin middleware after a token is accepted.
#[derive(Debug, Clone, Copy)]
pub struct AdminContext;

// ═══════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct KycRequest {
    pub personal: PersonalInfo,
    pub id: IdInfo,
    pub documents: KycDocuments,
}

/// Bank details as posted. Converted into `FundsInput` immediately so the
/// full numbers sit in zeroizing buffers for the rest of the request.
#[derive(Deserialize)]
pub struct FundsRequest {
    pub bank_name: String,
    pub account_number: String,
    #[serde(default)]
    pub routing_number: String,
    pub investment_amount: u64,
    pub bank_statement: Option<BlobHandle>,
    #[serde(default)]
    pub reference_letter: Option<BlobHandle>,
}

impl From<FundsRequest> for FundsInput {
    fn from(req: FundsRequest) -> Self {
        FundsInput {
            bank_name: req.bank_name,
            account_number: Zeroizing::new(req.account_number),
            routing_number: Zeroizing::new(req.routing_number),
            investment_amount: req.investment_amount,
            bank_statement: req.bank_statement,
            reference_letter: req.reference_letter,
        }
    }
}

impl std::fmt::Debug for FundsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundsRequest")
            .field("bank_name", &self.bank_name)
            .field("account_number", &"<redacted>")
            .field("routing_number", &"<redacted>")
            .field("investment_amount", &self.investment_amount)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct FundsReviewRequest {
    pub decision: ReviewDecision,
}

// ═══════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub overall_status: OverallStatus,
    pub record: InvestorRecord,
}

impl SessionResponse {
    pub fn new(session_id: Uuid, record: InvestorRecord) -> Self {
        Self {
            session_id,
            overall_status: compute_overall_status(&record),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub session_id: Uuid,
    pub result: StageResult,
    pub stages: StageStatuses,
    pub overall_status: OverallStatus,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub session_id: Uuid,
    pub archived_id: Uuid,
    pub completed_at: NaiveDateTime,
    /// Fresh record the session continues with.
    pub next_record: InvestorRecord,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub kind: UploadKind,
    pub handle: BlobHandle,
}
