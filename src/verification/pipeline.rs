//! The verification state machine.
//!
//! Each stage moves `incomplete -> {verified | rejected | flagged | pending}`.
//! KYC gates every other stage. Terminal statuses are only left through an
//! explicit restart, which allocates a new record. `pending` (funds only)
//! may be re-evaluated by resubmitting, or resolved by an administrator.

use std::sync::Arc;

use chrono::Local;
use rusqlite::Connection;

use crate::db::repository::archive;
use crate::models::*;

use super::accreditation;
use super::error::VerificationError;
use super::screening::{self, FaceMatcher, RandomRiskScorer, RiskScorer, SimulatedFaceMatcher};
use super::types::*;
use super::validation::{self, is_present};

/// Largest planned investment accepted in one verification, in USD.
pub const MAX_INVESTMENT_AMOUNT: u64 = 1_000_000_000_000;

/// Runs stage submissions against an investor record.
///
/// Holds the screening capabilities; the record itself is always passed in.
#[derive(Clone)]
pub struct VerificationPipeline {
    face_matcher: Arc<dyn FaceMatcher>,
    risk_scorer: Arc<dyn RiskScorer>,
}

impl VerificationPipeline {
    pub fn new(face_matcher: Arc<dyn FaceMatcher>, risk_scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            face_matcher,
            risk_scorer,
        }
    }

    /// Pipeline backed by the randomized simulations.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedFaceMatcher), Arc::new(RandomRiskScorer))
    }

    // ── KYC ─────────────────────────────────────────────────

    pub fn submit_kyc(
        &self,
        record: &mut InvestorRecord,
        personal: PersonalInfo,
        id: IdInfo,
        documents: KycDocuments,
    ) -> Result<StageResult, VerificationError> {
        ensure_open(record, Stage::Kyc)?;

        let date_of_birth = match personal.date_of_birth {
            Some(dob) => dob,
            None => return Err(missing_personal_fields()),
        };
        let id_type = match id.id_type {
            Some(t) => t,
            None => return Err(missing_personal_fields()),
        };
        let required = [
            &personal.first_name,
            &personal.last_name,
            &personal.email,
            &personal.phone,
            &personal.country,
            &personal.address,
            &id.id_number,
        ];
        if !required.iter().all(|v| is_present(v)) {
            return Err(missing_personal_fields());
        }

        let (id_front, selfie, address_proof) = match (
            present_handle(documents.id_front),
            present_handle(documents.selfie),
            present_handle(documents.address_proof),
        ) {
            (Some(front), Some(selfie), Some(proof)) => (front, selfie, proof),
            _ => {
                return Err(VerificationError::precondition(
                    Stage::Kyc,
                    "Please upload all required documents (ID, selfie, and address proof)",
                ))
            }
        };

        let id_number = id.id_number.trim().to_string();
        let id_check = validation::check_id_format(id_type, &id_number);
        if !id_check.valid {
            return Err(VerificationError::format(
                "id_number",
                format!("Please correct the ID format issue: {}", id_check.message),
            ));
        }

        let face = self.face_matcher.compare(&id_front, &selfie);
        let mut warnings = Vec::new();
        if !face.matched {
            tracing::warn!(record_id = %record.id, confidence = face.confidence, "Face match failed; continuing");
            warnings.push(format!("Face verification notice: {}", face.message));
        }

        record.kyc = Some(KycDetails {
            first_name: personal.first_name.trim().to_string(),
            last_name: personal.last_name.trim().to_string(),
            date_of_birth,
            email: personal.email.trim().to_string(),
            phone: personal.phone.trim().to_string(),
            country: personal.country.trim().to_string(),
            address: personal.address.trim().to_string(),
            id_type,
            id_number,
            id_front,
            id_back: present_handle(documents.id_back),
            selfie,
            address_proof_type: documents.address_proof_type,
            address_proof,
            face_verification: face.message,
            verified_at: Local::now().naive_local(),
        });
        record.stages.set(Stage::Kyc, StageStatus::Verified);

        tracing::info!(record_id = %record.id, id_type = %id_type, "KYC verified");

        let mut result = StageResult::new(
            Stage::Kyc,
            StageStatus::Verified,
            vec![id_check.message],
        );
        result.warnings = warnings;
        Ok(result)
    }

    // ── Accreditation ───────────────────────────────────────

    pub fn submit_accreditation(
        &self,
        record: &mut InvestorRecord,
        input: AccreditationInput,
    ) -> Result<StageResult, VerificationError> {
        ensure_kyc_verified(record, Stage::Accreditation)?;
        ensure_open(record, Stage::Accreditation)?;

        if input.annual_income == 0 && input.net_worth == 0 {
            return Err(VerificationError::precondition(
                Stage::Accreditation,
                "Please provide either annual income or net worth information",
            ));
        }

        let income_proof = input.income_proof.filter(|p| !p.document.is_empty());
        let net_worth_proof = input.net_worth_proof.filter(|p| !p.document.is_empty());
        if income_proof.is_none() && net_worth_proof.is_none() {
            return Err(VerificationError::precondition(
                Stage::Accreditation,
                "Please upload at least one verification document",
            ));
        }

        let decision = accreditation::evaluate(
            input.annual_income,
            input.net_worth,
            input.years_experience,
        );
        let status = if decision.accredited {
            StageStatus::Verified
        } else {
            StageStatus::Rejected
        };

        record.accreditation = Some(AccreditationDetails {
            annual_income: input.annual_income,
            net_worth: input.net_worth,
            years_experience: input.years_experience,
            income_proof,
            net_worth_proof,
            accredited: decision.accredited,
            reasons: decision.reasons.clone(),
            evaluated_at: Local::now().naive_local(),
        });
        record.stages.set(Stage::Accreditation, status);

        tracing::info!(record_id = %record.id, %status, "Accreditation evaluated");

        Ok(StageResult::new(Stage::Accreditation, status, decision.reasons))
    }

    // ── AML ─────────────────────────────────────────────────

    pub fn submit_aml(
        &self,
        record: &mut InvestorRecord,
        input: AmlInput,
    ) -> Result<StageResult, VerificationError> {
        ensure_kyc_verified(record, Stage::Aml)?;
        ensure_open(record, Stage::Aml)?;

        if input.wealth_sources.is_empty() {
            return Err(VerificationError::precondition(
                Stage::Aml,
                "Please select at least one source of wealth",
            ));
        }

        let other_selected = input.wealth_sources.contains(&WealthSource::Other);
        let other_wealth = input.other_wealth.filter(|s| is_present(s));
        if other_selected && other_wealth.is_none() {
            return Err(VerificationError::precondition(
                Stage::Aml,
                "Please specify your other source of wealth",
            ));
        }

        let pep_details = input.pep.details.filter(|s| is_present(s));
        if input.pep.politically_exposed && pep_details.is_none() {
            return Err(VerificationError::precondition(
                Stage::Aml,
                "Please provide details about your political exposure",
            ));
        }

        // ensure_kyc_verified guarantees KYC details are present
        let (full_name, country) = record
            .kyc
            .as_ref()
            .map(|k| (k.full_name(), k.country.clone()))
            .unwrap_or_default();

        let screening = screening::screen(&full_name, &country, self.risk_scorer.as_ref());
        let status = if screening.passed {
            StageStatus::Verified
        } else {
            StageStatus::Flagged
        };

        let mut wealth_sources = Vec::with_capacity(input.wealth_sources.len());
        for source in input.wealth_sources {
            if !wealth_sources.contains(&source) {
                wealth_sources.push(source);
            }
        }

        record.aml = Some(AmlDetails {
            politically_exposed: input.pep.politically_exposed,
            pep_details: if input.pep.politically_exposed { pep_details } else { None },
            wealth_sources,
            other_wealth: if other_selected { other_wealth } else { None },
            wealth_details: input.wealth_details.trim().to_string(),
            risk_score: screening.risk_score,
            passed: screening.passed,
            risk_factors: screening.risk_factors.clone(),
            screened_at: screening.screened_at,
        });
        record.stages.set(Stage::Aml, status);

        tracing::info!(
            record_id = %record.id,
            risk_score = screening.risk_score,
            %status,
            "AML screening complete"
        );

        let mut result = StageResult::new(Stage::Aml, status, screening.risk_factors);
        result.risk_score = Some(screening.risk_score);
        Ok(result)
    }

    // ── Proof of funds ──────────────────────────────────────

    /// Validate bank details. Full account and routing numbers are dropped
    /// (and zeroed) when `input` goes out of scope; only the last four
    /// characters reach the record.
    pub fn submit_funds(
        &self,
        record: &mut InvestorRecord,
        input: FundsInput,
    ) -> Result<StageResult, VerificationError> {
        ensure_kyc_verified(record, Stage::Funds)?;
        ensure_open(record, Stage::Funds)?;

        let statement = present_handle(input.bank_statement.clone());
        let statement = match statement {
            Some(s)
                if is_present(&input.bank_name)
                    && is_present(&input.account_number)
                    && input.investment_amount > 0 =>
            {
                s
            }
            _ => {
                return Err(VerificationError::precondition(
                    Stage::Funds,
                    "Please provide all required bank information and planned investment amount",
                ))
            }
        };

        if input.investment_amount > MAX_INVESTMENT_AMOUNT {
            return Err(VerificationError::precondition(
                Stage::Funds,
                format!(
                    "Planned investment amount cannot exceed {}",
                    accreditation::format_usd(MAX_INVESTMENT_AMOUNT)
                ),
            ));
        }

        let account_number: &str = &input.account_number;
        let routing_number: &str = &input.routing_number;
        let bank = validation::validate_bank_details(account_number, routing_number, &input.bank_name);
        let status = if bank.valid() {
            StageStatus::Verified
        } else {
            StageStatus::Pending
        };

        record.funds = Some(FundsDetails {
            bank_name: input.bank_name.trim().to_string(),
            account_last4: validation::last_four(account_number),
            routing_last4: if routing_number.is_empty() {
                None
            } else {
                Some(validation::last_four(routing_number))
            },
            bank_statement: statement,
            reference_letter: present_handle(input.reference_letter.clone()),
            investment_amount: input.investment_amount,
            checks: bank.checks.clone(),
            valid: bank.valid(),
            submitted_at: Local::now().naive_local(),
            reviewed_at: None,
        });
        record.stages.set(Stage::Funds, status);

        tracing::info!(record_id = %record.id, %status, "Proof of funds evaluated");

        Ok(StageResult::new(Stage::Funds, status, bank.checks))
    }
}

// ── Aggregate status & lifecycle ───────────────────────────

/// `complete` iff every stage is `verified`.
pub fn compute_overall_status(record: &InvestorRecord) -> OverallStatus {
    if Stage::ALL
        .iter()
        .all(|stage| record.stage_status(*stage) == StageStatus::Verified)
    {
        OverallStatus::Complete
    } else {
        OverallStatus::Incomplete
    }
}

/// Archive a complete record and reset `record` to a fresh blank one.
///
/// The append happens in a single transaction; if it fails the active
/// record is left untouched.
pub fn finalize_verification(
    conn: &Connection,
    record: &mut InvestorRecord,
) -> Result<ArchivedRecord, VerificationError> {
    if compute_overall_status(record) != OverallStatus::Complete {
        let open: Vec<Stage> = Stage::ALL
            .iter()
            .copied()
            .filter(|stage| record.stage_status(*stage) != StageStatus::Verified)
            .collect();
        let labels: Vec<&str> = open.iter().map(|stage| stage.label()).collect();
        return Err(VerificationError::PreconditionViolation {
            stage: open.first().copied().unwrap_or(Stage::Kyc),
            reason: format!(
                "Verification is not complete; still outstanding: {}",
                labels.join(", ")
            ),
        });
    }

    let completed_at = Local::now().naive_local();
    let mut completed = record.clone();
    completed.completed_at = Some(completed_at);
    let archived = ArchivedRecord {
        record: completed,
        completed_at,
    };

    archive::insert_archived(conn, &archived)?;
    *record = InvestorRecord::new();

    tracing::info!(
        archived_id = %archived.record.id,
        next_id = %record.id,
        "Verification finalized and archived"
    );

    Ok(archived)
}

/// Explicit user restart: replace the record with a blank one.
pub fn restart_verification(record: &mut InvestorRecord) {
    let previous = record.id;
    *record = InvestorRecord::new();
    tracing::info!(previous_id = %previous, next_id = %record.id, "Verification restarted");
}

/// Administrative resolution of a funds stage waiting for manual review.
pub fn resolve_pending_funds(
    record: &mut InvestorRecord,
    decision: ReviewDecision,
) -> Result<StageResult, VerificationError> {
    let current = record.stage_status(Stage::Funds);
    if current != StageStatus::Pending {
        return Err(VerificationError::precondition(
            Stage::Funds,
            format!("Only a pending funds stage can be reviewed (current status: {current})"),
        ));
    }

    let status = match decision {
        ReviewDecision::Approve => StageStatus::Verified,
        ReviewDecision::Reject => StageStatus::Rejected,
    };
    let reason = match decision {
        ReviewDecision::Approve => "Approved after manual review",
        ReviewDecision::Reject => "Rejected after manual review",
    };

    if let Some(funds) = record.funds.as_mut() {
        funds.reviewed_at = Some(Local::now().naive_local());
        funds.checks.push(reason.to_string());
    }
    record.stages.set(Stage::Funds, status);

    tracing::info!(record_id = %record.id, %status, "Pending funds resolved by review");

    Ok(StageResult::new(Stage::Funds, status, vec![reason.to_string()]))
}

// ── Gating helpers ─────────────────────────────────────────

fn ensure_kyc_verified(record: &InvestorRecord, stage: Stage) -> Result<(), VerificationError> {
    if record.stage_status(Stage::Kyc) != StageStatus::Verified || record.kyc.is_none() {
        return Err(VerificationError::precondition(
            stage,
            "prerequisite not met: please complete KYC verification first",
        ));
    }
    Ok(())
}

fn ensure_open(record: &InvestorRecord, stage: Stage) -> Result<(), VerificationError> {
    let current = record.stage_status(stage);
    if current.is_terminal() {
        return Err(VerificationError::precondition(
            stage,
            format!("stage is already {current}; start a new verification to resubmit"),
        ));
    }
    Ok(())
}

fn present_handle(handle: Option<BlobHandle>) -> Option<BlobHandle> {
    handle.filter(|h| !h.is_empty())
}

fn missing_personal_fields() -> VerificationError {
    VerificationError::precondition(
        Stage::Kyc,
        "Please fill in all required personal and ID information fields",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::verification::screening::{FixedFaceMatcher, FixedRiskScorer, BASELINE_RANGE};
    use chrono::NaiveDate;
    use zeroize::Zeroizing;

    fn pipeline() -> VerificationPipeline {
        VerificationPipeline::new(
            Arc::new(FixedFaceMatcher {
                matched: true,
                confidence: 90.0,
            }),
            Arc::new(FixedRiskScorer(11)),
        )
    }

    fn personal(first: &str, last: &str, country: &str) -> PersonalInfo {
        PersonalInfo {
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            email: "investor@example.com".into(),
            phone: "+91 98765 43210".into(),
            country: country.into(),
            address: "12 MG Road, Bengaluru".into(),
        }
    }

    fn aadhar(number: &str) -> IdInfo {
        IdInfo {
            id_type: Some(IdType::Aadhar),
            id_number: number.into(),
        }
    }

    fn documents() -> KycDocuments {
        KycDocuments {
            id_front: Some(BlobHandle::new("ids/front.png")),
            id_back: None,
            selfie: Some(BlobHandle::new("selfies/me.jpg")),
            address_proof_type: AddressProofType::UtilityBill,
            address_proof: Some(BlobHandle::new("documents/bill.pdf")),
        }
    }

    fn verified_kyc(p: &VerificationPipeline, first: &str, last: &str, country: &str) -> InvestorRecord {
        let mut record = InvestorRecord::new();
        p.submit_kyc(&mut record, personal(first, last, country), aadhar("123456789012"), documents())
            .unwrap();
        record
    }

    fn accreditation(income: u64, net_worth: u64, years: u32) -> AccreditationInput {
        AccreditationInput {
            annual_income: income,
            net_worth,
            years_experience: years,
            income_proof: Some(IncomeProof {
                kind: IncomeProofType::TaxReturns,
                document: BlobHandle::new("documents/itr.pdf"),
            }),
            net_worth_proof: None,
        }
    }

    fn aml() -> AmlInput {
        AmlInput {
            pep: PepDeclaration::default(),
            wealth_sources: vec![WealthSource::EmploymentIncome],
            other_wealth: None,
            wealth_details: "Salary from software engineering".into(),
        }
    }

    fn funds(account: &str, routing: &str, bank: &str) -> FundsInput {
        FundsInput {
            bank_name: bank.into(),
            account_number: Zeroizing::new(account.into()),
            routing_number: Zeroizing::new(routing.into()),
            investment_amount: 25_000,
            bank_statement: Some(BlobHandle::new("documents/statement.pdf")),
            reference_letter: None,
        }
    }

    fn fully_verified(p: &VerificationPipeline) -> InvestorRecord {
        let mut record = verified_kyc(p, "Asha", "Rao", "India");
        p.submit_accreditation(&mut record, accreditation(250_000, 0, 0)).unwrap();
        p.submit_aml(&mut record, aml()).unwrap();
        p.submit_funds(&mut record, funds("12345678901", "", "Acme Bank")).unwrap();
        record
    }

    // ── KYC ──

    #[test]
    fn kyc_success_records_details_and_face_message() {
        let p = pipeline();
        let record = verified_kyc(&p, "Asha", "Rao", "India");
        assert_eq!(record.stage_status(Stage::Kyc), StageStatus::Verified);
        let kyc = record.kyc.unwrap();
        assert_eq!(kyc.full_name(), "Asha Rao");
        assert!(kyc.face_verification.contains("90.00%"));
    }

    #[test]
    fn kyc_missing_field_stays_incomplete() {
        let p = pipeline();
        let mut record = InvestorRecord::new();
        let mut info = personal("Asha", "Rao", "India");
        info.email = "  ".into();
        let err = p
            .submit_kyc(&mut record, info, aadhar("123456789012"), documents())
            .unwrap_err();
        assert!(matches!(err, VerificationError::PreconditionViolation { stage: Stage::Kyc, .. }));
        assert_eq!(record.stage_status(Stage::Kyc), StageStatus::Incomplete);
        assert!(record.kyc.is_none());
    }

    #[test]
    fn kyc_missing_selfie_is_precondition_violation() {
        let p = pipeline();
        let mut record = InvestorRecord::new();
        let mut docs = documents();
        docs.selfie = None;
        let err = p
            .submit_kyc(&mut record, personal("Asha", "Rao", "India"), aadhar("123456789012"), docs)
            .unwrap_err();
        assert!(err.to_string().contains("selfie"));
    }

    #[test]
    fn kyc_bad_id_format_is_format_invalid() {
        let p = pipeline();
        let mut record = InvestorRecord::new();
        let err = p
            .submit_kyc(&mut record, personal("Asha", "Rao", "India"), aadhar("12345"), documents())
            .unwrap_err();
        assert!(matches!(err, VerificationError::FormatInvalid { field: "id_number", .. }));
        assert!(err.to_string().contains("Invalid Aadhar format"));
        assert_eq!(record.stage_status(Stage::Kyc), StageStatus::Incomplete);
    }

    #[test]
    fn failed_face_match_warns_but_verifies() {
        let p = VerificationPipeline::new(
            Arc::new(FixedFaceMatcher {
                matched: false,
                confidence: 40.0,
            }),
            Arc::new(FixedRiskScorer(11)),
        );
        let mut record = InvestorRecord::new();
        let result = p
            .submit_kyc(&mut record, personal("Asha", "Rao", "India"), aadhar("123456789012"), documents())
            .unwrap();
        assert_eq!(result.status, StageStatus::Verified);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Face verification notice"));
    }

    #[test]
    fn kyc_cannot_be_resubmitted_once_verified() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let err = p
            .submit_kyc(&mut record, personal("Other", "Person", "India"), aadhar("123456789012"), documents())
            .unwrap_err();
        assert!(matches!(err, VerificationError::PreconditionViolation { .. }));
        assert_eq!(record.kyc.unwrap().first_name, "Asha");
    }

    // ── Gating ──

    #[test]
    fn later_stages_require_kyc() {
        let p = pipeline();
        let mut record = InvestorRecord::new();

        let errs = [
            p.submit_accreditation(&mut record, accreditation(250_000, 0, 0)).unwrap_err(),
            p.submit_aml(&mut record, aml()).unwrap_err(),
            p.submit_funds(&mut record, funds("12345678901", "", "Acme Bank")).unwrap_err(),
        ];
        for err in errs {
            match err {
                VerificationError::PreconditionViolation { reason, .. } => {
                    assert!(reason.contains("prerequisite not met"))
                }
                other => panic!("expected PreconditionViolation, got {other:?}"),
            }
        }
        for stage in Stage::ALL {
            assert_eq!(record.stage_status(stage), StageStatus::Incomplete);
        }
    }

    // ── Accreditation ──

    #[test]
    fn accreditation_by_income_is_verified() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let result = p
            .submit_accreditation(&mut record, accreditation(200_000, 0, 0))
            .unwrap();
        assert_eq!(result.status, StageStatus::Verified);
        assert!(result.reasons[0].contains("Annual income"));
    }

    #[test]
    fn accreditation_below_thresholds_is_rejected_and_terminal() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let result = p
            .submit_accreditation(&mut record, accreditation(50_000, 50_000, 2))
            .unwrap();
        assert_eq!(result.status, StageStatus::Rejected);
        assert_eq!(record.stage_status(Stage::Accreditation), StageStatus::Rejected);

        let err = p
            .submit_accreditation(&mut record, accreditation(500_000, 0, 0))
            .unwrap_err();
        assert!(matches!(err, VerificationError::PreconditionViolation { .. }));
        assert_eq!(record.stage_status(Stage::Accreditation), StageStatus::Rejected);
    }

    #[test]
    fn accreditation_requires_figures_and_proof() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        assert!(p.submit_accreditation(&mut record, accreditation(0, 0, 10)).is_err());

        let mut no_proof = accreditation(250_000, 0, 0);
        no_proof.income_proof = None;
        let err = p.submit_accreditation(&mut record, no_proof).unwrap_err();
        assert!(err.to_string().contains("verification document"));
        assert_eq!(record.stage_status(Stage::Accreditation), StageStatus::Incomplete);
    }

    // ── AML ──

    #[test]
    fn aml_high_risk_name_is_flagged() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Vladimir", "Putin", "Syria");
        let result = p.submit_aml(&mut record, aml()).unwrap();
        assert!(result.risk_score.unwrap() >= 33);
        assert_eq!(result.status, StageStatus::Flagged);
        assert_eq!(record.stage_status(Stage::Aml), StageStatus::Flagged);
    }

    #[test]
    fn aml_single_name_flag_scores_penalty() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "John", "Doe", "India");
        let result = p.submit_aml(&mut record, aml()).unwrap();
        assert_eq!(result.risk_score, Some(33));
        assert!(result.reasons.contains(&"Potential match on PEP/Sanctions list".to_string()));
    }

    #[test]
    fn aml_clean_investor_verified_with_baseline() {
        let p = VerificationPipeline::new(
            Arc::new(FixedFaceMatcher {
                matched: true,
                confidence: 90.0,
            }),
            Arc::new(RandomRiskScorer),
        );
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let result = p.submit_aml(&mut record, aml()).unwrap();
        assert_eq!(result.status, StageStatus::Verified);
        assert!(BASELINE_RANGE.contains(&result.risk_score.unwrap()));
        assert_eq!(result.reasons, vec![screening::NO_RISK_FACTORS]);
    }

    #[test]
    fn aml_repeated_wealth_sources_are_stored_once() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let mut input = aml();
        input.wealth_sources = vec![
            WealthSource::Investments,
            WealthSource::Inheritance,
            WealthSource::Investments,
        ];
        p.submit_aml(&mut record, input).unwrap();
        assert_eq!(
            record.aml.unwrap().wealth_sources,
            vec![WealthSource::Investments, WealthSource::Inheritance]
        );
    }

    #[test]
    fn aml_other_source_requires_explanation() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let mut input = aml();
        input.wealth_sources = vec![WealthSource::Other];
        input.other_wealth = Some(" ".into());
        let err = p.submit_aml(&mut record, input).unwrap_err();
        assert!(err.to_string().contains("other source of wealth"));

        let mut none = aml();
        none.wealth_sources.clear();
        assert!(p.submit_aml(&mut record, none).is_err());
    }

    #[test]
    fn aml_pep_yes_requires_details() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let mut input = aml();
        input.pep = PepDeclaration {
            politically_exposed: true,
            details: None,
        };
        let err = p.submit_aml(&mut record, input).unwrap_err();
        assert!(err.to_string().contains("political exposure"));
    }

    // ── Funds ──

    #[test]
    fn funds_valid_details_verified_and_redacted() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let result = p
            .submit_funds(&mut record, funds("12345678901", "", "Acme Bank"))
            .unwrap();
        assert_eq!(result.status, StageStatus::Verified);

        let stored = record.funds.unwrap();
        assert_eq!(stored.account_last4, "8901");
        assert_eq!(stored.routing_last4, None);
        let json = serde_json::to_string(&record.stages).unwrap();
        assert!(json.contains("\"funds\":\"verified\""));
    }

    #[test]
    fn funds_full_numbers_never_reach_record() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        p.submit_funds(&mut record, funds("98765432109876", "021000021", "Acme Bank"))
            .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("98765432109876"));
        assert!(!json.contains("021000021"));
        assert_eq!(record.funds.unwrap().routing_last4.as_deref(), Some("0021"));
    }

    #[test]
    fn funds_bad_account_is_pending_not_rejected() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let result = p.submit_funds(&mut record, funds("123", "", "Acme Bank")).unwrap();
        assert_eq!(result.status, StageStatus::Pending);
        assert!(result.reasons.contains(&"Account number format is invalid".to_string()));
        assert_eq!(record.funds.as_ref().unwrap().account_last4, "123");
    }

    #[test]
    fn pending_funds_can_be_resubmitted() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        p.submit_funds(&mut record, funds("123", "", "Acme Bank")).unwrap();
        let result = p
            .submit_funds(&mut record, funds("12345678901", "", "Acme Bank"))
            .unwrap();
        assert_eq!(result.status, StageStatus::Verified);
    }

    #[test]
    fn funds_requires_statement_and_amount() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let mut input = funds("12345678901", "", "Acme Bank");
        input.investment_amount = 0;
        assert!(p.submit_funds(&mut record, input).is_err());

        let mut input = funds("12345678901", "", "Acme Bank");
        input.bank_statement = None;
        assert!(p.submit_funds(&mut record, input).is_err());
        assert_eq!(record.stage_status(Stage::Funds), StageStatus::Incomplete);
    }

    #[test]
    fn funds_amount_above_cap_is_refused() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");

        let mut input = funds("12345678901", "", "Acme Bank");
        input.investment_amount = u64::MAX;
        let err = p.submit_funds(&mut record, input).unwrap_err();
        assert!(matches!(
            err,
            VerificationError::PreconditionViolation { stage: Stage::Funds, .. }
        ));
        assert_eq!(record.stage_status(Stage::Funds), StageStatus::Incomplete);
        assert!(record.funds.is_none());

        let mut input = funds("12345678901", "", "Acme Bank");
        input.investment_amount = MAX_INVESTMENT_AMOUNT;
        let result = p.submit_funds(&mut record, input).unwrap();
        assert_eq!(result.status, StageStatus::Verified);
    }

    #[test]
    fn largest_investment_can_be_finalized() {
        let conn = open_memory_database().unwrap();
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        p.submit_accreditation(&mut record, accreditation(250_000, 0, 0)).unwrap();
        p.submit_aml(&mut record, aml()).unwrap();
        let mut input = funds("12345678901", "", "Acme Bank");
        input.investment_amount = MAX_INVESTMENT_AMOUNT;
        p.submit_funds(&mut record, input).unwrap();

        let archived = finalize_verification(&conn, &mut record).unwrap();
        assert_eq!(archived.investment_amount(), MAX_INVESTMENT_AMOUNT);
        let stats = archive::archive_stats(&conn).unwrap();
        assert_eq!(stats.total_investment, u128::from(MAX_INVESTMENT_AMOUNT));
    }

    #[test]
    fn review_promotes_pending_funds() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        p.submit_funds(&mut record, funds("123", "", "Acme Bank")).unwrap();

        let result = resolve_pending_funds(&mut record, ReviewDecision::Approve).unwrap();
        assert_eq!(result.status, StageStatus::Verified);
        assert!(record.funds.as_ref().unwrap().reviewed_at.is_some());

        let err = resolve_pending_funds(&mut record, ReviewDecision::Reject).unwrap_err();
        assert!(matches!(err, VerificationError::PreconditionViolation { .. }));
    }

    // ── Overall status & finalize ──

    #[test]
    fn overall_complete_only_when_all_verified() {
        let p = pipeline();
        let mut record = fully_verified(&p);
        assert_eq!(compute_overall_status(&record), OverallStatus::Complete);

        for stage in Stage::ALL {
            let mut copy = record.clone();
            copy.stages.set(stage, StageStatus::Pending);
            assert_eq!(compute_overall_status(&copy), OverallStatus::Incomplete);
        }

        record.stages.set(Stage::Aml, StageStatus::Flagged);
        assert_eq!(compute_overall_status(&record), OverallStatus::Incomplete);
    }

    #[test]
    fn finalize_incomplete_record_is_rejected() {
        let conn = open_memory_database().unwrap();
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let id = record.id;

        let err = finalize_verification(&conn, &mut record).unwrap_err();
        assert!(err.to_string().contains("not complete"));
        assert!(matches!(
            err,
            VerificationError::PreconditionViolation { stage: Stage::Accreditation, .. }
        ));
        assert_eq!(record.id, id);
        assert!(archive::list_archived(&conn).unwrap().is_empty());
    }

    #[test]
    fn finalize_archives_once_and_resets() {
        let conn = open_memory_database().unwrap();
        let p = pipeline();
        let mut record = fully_verified(&p);
        let original_id = record.id;

        let archived = finalize_verification(&conn, &mut record).unwrap();
        assert_eq!(archived.record.id, original_id);
        assert_eq!(archived.record.completed_at, Some(archived.completed_at));

        assert_ne!(record.id, original_id);
        for stage in Stage::ALL {
            assert_eq!(record.stage_status(stage), StageStatus::Incomplete);
        }
        assert!(record.kyc.is_none());

        let listed = archive::list_archived(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, original_id);
        assert_eq!(listed[0].full_name, "Asha Rao");
    }

    #[test]
    fn restart_allocates_fresh_record() {
        let p = pipeline();
        let mut record = verified_kyc(&p, "Asha", "Rao", "India");
        let id = record.id;
        restart_verification(&mut record);
        assert_ne!(record.id, id);
        assert_eq!(record.stage_status(Stage::Kyc), StageStatus::Incomplete);
    }
}
