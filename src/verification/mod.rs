//! Investor verification: four gated stages (KYC, accreditation, AML,
//! proof of funds) evaluated against a single in-progress record, then
//! archived once every stage is verified.

pub mod accreditation;
pub mod error;
pub mod pipeline;
pub mod screening;
pub mod types;
pub mod validation;

pub use error::VerificationError;
pub use pipeline::{
    compute_overall_status, finalize_verification, resolve_pending_funds, restart_verification,
    VerificationPipeline,
};
pub use screening::{FaceMatcher, RiskScorer};
pub use types::*;
