use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    AddressProofType, IdType, IncomeProofType, NetWorthProofType, Stage, StageStatus,
    WealthSource,
};

/// Opaque reference to an uploaded file in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStatuses {
    pub kyc: StageStatus,
    pub accreditation: StageStatus,
    pub aml: StageStatus,
    pub funds: StageStatus,
}

impl StageStatuses {
    pub fn incomplete() -> Self {
        Self {
            kyc: StageStatus::Incomplete,
            accreditation: StageStatus::Incomplete,
            aml: StageStatus::Incomplete,
            funds: StageStatus::Incomplete,
        }
    }

    pub fn get(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Kyc => self.kyc,
            Stage::Accreditation => self.accreditation,
            Stage::Aml => self.aml,
            Stage::Funds => self.funds,
        }
    }

    pub fn set(&mut self, stage: Stage, status: StageStatus) {
        let slot = match stage {
            Stage::Kyc => &mut self.kyc,
            Stage::Accreditation => &mut self.accreditation,
            Stage::Aml => &mut self.aml,
            Stage::Funds => &mut self.funds,
        };
        *slot = status;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub address: String,
    pub id_type: IdType,
    pub id_number: String,
    pub id_front: BlobHandle,
    pub id_back: Option<BlobHandle>,
    pub selfie: BlobHandle,
    pub address_proof_type: AddressProofType,
    pub address_proof: BlobHandle,
    pub face_verification: String,
    pub verified_at: NaiveDateTime,
}

impl KycDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProof {
    pub kind: IncomeProofType,
    pub document: BlobHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorthProof {
    pub kind: NetWorthProofType,
    pub document: BlobHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccreditationDetails {
    pub annual_income: u64,
    pub net_worth: u64,
    pub years_experience: u32,
    pub income_proof: Option<IncomeProof>,
    pub net_worth_proof: Option<NetWorthProof>,
    pub accredited: bool,
    pub reasons: Vec<String>,
    pub evaluated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmlDetails {
    pub politically_exposed: bool,
    pub pep_details: Option<String>,
    pub wealth_sources: Vec<WealthSource>,
    pub other_wealth: Option<String>,
    pub wealth_details: String,
    pub risk_score: u32,
    pub passed: bool,
    pub risk_factors: Vec<String>,
    pub screened_at: NaiveDateTime,
}

/// Bank details as persisted: account and routing numbers keep only their
/// last four characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsDetails {
    pub bank_name: String,
    pub account_last4: String,
    pub routing_last4: Option<String>,
    pub bank_statement: BlobHandle,
    pub reference_letter: Option<BlobHandle>,
    pub investment_amount: u64,
    pub checks: Vec<String>,
    pub valid: bool,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
}

/// One in-progress investor verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorRecord {
    pub id: Uuid,
    pub stages: StageStatuses,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub kyc: Option<KycDetails>,
    pub accreditation: Option<AccreditationDetails>,
    pub aml: Option<AmlDetails>,
    pub funds: Option<FundsDetails>,
}

impl InvestorRecord {
    /// Blank record with a fresh id and every stage `incomplete`.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stages: StageStatuses::incomplete(),
            started_at: Local::now().naive_local(),
            completed_at: None,
            kyc: None,
            accreditation: None,
            aml: None,
            funds: None,
        }
    }

    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        self.stages.get(stage)
    }
}

impl Default for InvestorRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A completed verification moved into the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub record: InvestorRecord,
    pub completed_at: NaiveDateTime,
}

impl ArchivedRecord {
    pub fn full_name(&self) -> String {
        self.record
            .kyc
            .as_ref()
            .map(KycDetails::full_name)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn country(&self) -> String {
        self.record
            .kyc
            .as_ref()
            .map(|k| k.country.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn investment_amount(&self) -> u64 {
        self.record.funds.as_ref().map_or(0, |f| f.investment_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_incomplete() {
        let record = InvestorRecord::new();
        for stage in Stage::ALL {
            assert_eq!(record.stage_status(stage), StageStatus::Incomplete);
        }
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn new_records_get_distinct_ids() {
        assert_ne!(InvestorRecord::new().id, InvestorRecord::new().id);
    }

    #[test]
    fn set_touches_only_one_stage() {
        let mut statuses = StageStatuses::incomplete();
        statuses.set(Stage::Aml, StageStatus::Flagged);
        assert_eq!(statuses.get(Stage::Aml), StageStatus::Flagged);
        assert_eq!(statuses.get(Stage::Kyc), StageStatus::Incomplete);
        assert_eq!(statuses.get(Stage::Funds), StageStatus::Incomplete);
    }

    #[test]
    fn blob_handle_serializes_as_plain_string() {
        let handle = BlobHandle::new("ids/abc.png");
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"ids/abc.png\"");
        assert!(BlobHandle::new("  ").is_empty());
    }

    #[test]
    fn archived_record_without_kyc_reports_placeholders() {
        let archived = ArchivedRecord {
            record: InvestorRecord::new(),
            completed_at: Local::now().naive_local(),
        };
        assert_eq!(archived.full_name(), "N/A");
        assert_eq!(archived.country(), "N/A");
        assert_eq!(archived.investment_amount(), 0);
    }
}
