//! Stage inputs and the stage result returned by every submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::models::*;

use super::error::VerificationError;

// ═══════════════════════════════════════════
// KYC
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdInfo {
    pub id_type: Option<IdType>,
    pub id_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycDocuments {
    pub id_front: Option<BlobHandle>,
    pub id_back: Option<BlobHandle>,
    pub selfie: Option<BlobHandle>,
    pub address_proof_type: AddressProofType,
    pub address_proof: Option<BlobHandle>,
}

// ═══════════════════════════════════════════
// Accreditation
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccreditationInput {
    pub annual_income: u64,
    pub net_worth: u64,
    pub years_experience: u32,
    pub income_proof: Option<IncomeProof>,
    pub net_worth_proof: Option<NetWorthProof>,
}

// ═══════════════════════════════════════════
// AML
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PepDeclaration {
    pub politically_exposed: bool,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmlInput {
    pub pep: PepDeclaration,
    pub wealth_sources: Vec<WealthSource>,
    pub other_wealth: Option<String>,
    pub wealth_details: String,
}

// ═══════════════════════════════════════════
// Proof of funds
// ═══════════════════════════════════════════

/// Bank details as submitted. Account and routing numbers are wiped from
/// memory when this value is dropped at the end of the funds stage.
pub struct FundsInput {
    pub bank_name: String,
    pub account_number: Zeroizing<String>,
    pub routing_number: Zeroizing<String>,
    pub investment_amount: u64,
    pub bank_statement: Option<BlobHandle>,
    pub reference_letter: Option<BlobHandle>,
}

impl std::fmt::Debug for FundsInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundsInput")
            .field("bank_name", &self.bank_name)
            .field("account_number", &"<redacted>")
            .field("routing_number", &"<redacted>")
            .field("investment_amount", &self.investment_amount)
            .field("bank_statement", &self.bank_statement)
            .field("reference_letter", &self.reference_letter)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Result
// ═══════════════════════════════════════════

/// Outcome of one stage evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub reasons: Vec<String>,
    /// Advisory notices that did not block the stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
}

impl StageResult {
    pub fn new(stage: Stage, status: StageStatus, reasons: Vec<String>) -> Self {
        Self {
            stage,
            status,
            reasons,
            warnings: Vec::new(),
            risk_score: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == StageStatus::Verified
    }

    /// Turn a `rejected`/`flagged` decision into `PolicyRejected`.
    /// `verified` and `pending` pass through.
    pub fn ensure_passed(self) -> Result<Self, VerificationError> {
        match self.status {
            StageStatus::Rejected | StageStatus::Flagged => Err(VerificationError::PolicyRejected {
                stage: self.stage,
                status: self.status,
                reasons: self.reasons,
            }),
            _ => Ok(self),
        }
    }
}
