//! Verification error taxonomy.
//!
//! Every variant is recoverable: the investor corrects the input and
//! submits again. None of them is fatal to the process.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::{Stage, StageStatus};

#[derive(Error, Debug)]
pub enum VerificationError {
    /// Missing field or document, or a stage attempted out of order.
    #[error("{}: {reason}", .stage.label())]
    PreconditionViolation { stage: Stage, reason: String },

    /// ID, account or routing number does not match its pattern.
    #[error("Invalid {field}: {reason}")]
    FormatInvalid { field: &'static str, reason: String },

    /// The stage was evaluated and did not pass. Expected outcome, not a fault.
    #[error("{} ended as {status}: {}", .stage.label(), .reasons.join("; "))]
    PolicyRejected {
        stage: Stage,
        status: StageStatus,
        reasons: Vec<String>,
    },

    #[error("Archive error: {0}")]
    Database(#[from] DatabaseError),
}

impl VerificationError {
    pub(crate) fn precondition(stage: Stage, reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::FormatInvalid {
            field,
            reason: reason.into(),
        }
    }
}
