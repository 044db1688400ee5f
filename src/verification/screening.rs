//! Simulated screening capabilities: face match and AML risk scoring.
//!
//! Both checks sit behind traits so the pipeline can run with the
//! randomized simulations in production and fixed doubles in tests.

use std::ops::Range;

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::BlobHandle;

/// Names that trigger a potential PEP/sanctions match.
pub const HIGH_RISK_NAMES: &[&str] = &["John Doe", "Jane Smith", "Vladimir Putin", "Kim Jong Un"];

/// Jurisdictions that trigger a high-risk flag.
pub const HIGH_RISK_COUNTRIES: &[&str] = &["North Korea", "Iran", "Syria"];

/// Points added for each risk flag that fires.
pub const RISK_FLAG_PENALTY: u32 = 33;

/// Screening passes when the score is strictly below this.
pub const AML_PASS_THRESHOLD: u32 = 50;

/// Background risk assigned when no flag fires.
pub const BASELINE_RANGE: Range<u32> = 5..20;

pub const NO_RISK_FACTORS: &str = "No significant risk factors identified";

// ═══════════════════════════════════════════
// Face match
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub matched: bool,
    pub confidence: f32,
    pub message: String,
}

/// Compares the face on an identity document with a selfie.
pub trait FaceMatcher: Send + Sync {
    fn compare(&self, id_document: &BlobHandle, selfie: &BlobHandle) -> FaceMatch;
}

/// Stand-in for a real face-recognition backend: always matches with a
/// random confidence between 85% and 95%.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedFaceMatcher;

impl FaceMatcher for SimulatedFaceMatcher {
    fn compare(&self, _id_document: &BlobHandle, _selfie: &BlobHandle) -> FaceMatch {
        let confidence: f32 = rand::thread_rng().gen_range(85.0..95.0);
        FaceMatch {
            matched: true,
            confidence,
            message: format!("Match confirmed with confidence {confidence:.2}%"),
        }
    }
}

/// Face matcher with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedFaceMatcher {
    pub matched: bool,
    pub confidence: f32,
}

impl FaceMatcher for FixedFaceMatcher {
    fn compare(&self, _id_document: &BlobHandle, _selfie: &BlobHandle) -> FaceMatch {
        let message = if self.matched {
            format!("Match confirmed with confidence {:.2}%", self.confidence)
        } else {
            format!("No match (confidence {:.2}%)", self.confidence)
        };
        FaceMatch {
            matched: self.matched,
            confidence: self.confidence,
            message,
        }
    }
}

// ═══════════════════════════════════════════
// AML risk scoring
// ═══════════════════════════════════════════

/// Source of the background risk score used when no flag fires.
pub trait RiskScorer: Send + Sync {
    /// A score in `BASELINE_RANGE`.
    fn baseline_score(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRiskScorer;

impl RiskScorer for RandomRiskScorer {
    fn baseline_score(&self) -> u32 {
        rand::thread_rng().gen_range(BASELINE_RANGE)
    }
}

/// Returns the same baseline every time, clamped into `BASELINE_RANGE`.
#[derive(Debug, Clone, Copy)]
pub struct FixedRiskScorer(pub u32);

impl RiskScorer for FixedRiskScorer {
    fn baseline_score(&self) -> u32 {
        self.0.clamp(BASELINE_RANGE.start, BASELINE_RANGE.end - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmlScreening {
    pub passed: bool,
    pub risk_score: u32,
    pub risk_factors: Vec<String>,
    pub screened_at: NaiveDateTime,
}

/// Screen an investor by name and country of residence.
pub fn screen(full_name: &str, country: &str, scorer: &dyn RiskScorer) -> AmlScreening {
    let mut factors = Vec::new();

    if matches_high_risk_name(full_name) {
        factors.push("Potential match on PEP/Sanctions list".to_string());
    }
    if is_high_risk_country(country) {
        factors.push(format!("High-risk jurisdiction: {}", country.trim()));
    }

    let risk_score = if factors.is_empty() {
        scorer.baseline_score()
    } else {
        factors.len() as u32 * RISK_FLAG_PENALTY
    };

    if factors.is_empty() {
        factors.push(NO_RISK_FACTORS.to_string());
    }

    AmlScreening {
        passed: risk_score < AML_PASS_THRESHOLD,
        risk_score,
        risk_factors: factors,
        screened_at: Local::now().naive_local(),
    }
}

/// Case-insensitive containment: the investor's name appears within a
/// listed name ("Kim Jong" matches "Kim Jong Un").
pub fn matches_high_risk_name(full_name: &str) -> bool {
    let needle = normalize_name(full_name);
    if needle.is_empty() {
        return false;
    }
    HIGH_RISK_NAMES
        .iter()
        .any(|listed| normalize_name(listed).contains(&needle))
}

pub fn is_high_risk_country(country: &str) -> bool {
    let country = country.trim();
    HIGH_RISK_COUNTRIES
        .iter()
        .any(|listed| listed.eq_ignore_ascii_case(country))
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
