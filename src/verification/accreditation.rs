//! Accredited-investor decision rules.

use serde::{Deserialize, Serialize};

pub const INCOME_THRESHOLD: u64 = 200_000;
pub const NET_WORTH_THRESHOLD: u64 = 1_000_000;
pub const EXPERIENCE_YEARS_THRESHOLD: u32 = 5;
pub const EXPERIENCED_INCOME_THRESHOLD: u64 = 100_000;
pub const EXPERIENCED_NET_WORTH_THRESHOLD: u64 = 500_000;

pub const NO_CRITERIA_MET: &str = "Does not meet any accreditation criteria";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccreditationDecision {
    pub accredited: bool,
    pub reasons: Vec<String>,
}

/// An investor qualifies if ANY criterion holds; every satisfied criterion
/// contributes a reason.
pub fn evaluate(annual_income: u64, net_worth: u64, years_experience: u32) -> AccreditationDecision {
    let mut reasons = Vec::new();

    if annual_income >= INCOME_THRESHOLD {
        reasons.push(format!(
            "Annual income of {} meets minimum requirement",
            format_usd(annual_income)
        ));
    }

    if net_worth >= NET_WORTH_THRESHOLD {
        reasons.push(format!(
            "Net worth of {} meets minimum requirement",
            format_usd(net_worth)
        ));
    }

    if years_experience >= EXPERIENCE_YEARS_THRESHOLD
        && (annual_income >= EXPERIENCED_INCOME_THRESHOLD
            || net_worth >= EXPERIENCED_NET_WORTH_THRESHOLD)
    {
        reasons.push(format!(
            "{years_experience} years of investment experience with sufficient financial backing"
        ));
    }

    let accredited = !reasons.is_empty();
    if !accredited {
        reasons.push(NO_CRITERIA_MET.to_string());
    }

    AccreditationDecision { accredited, reasons }
}

/// Whole-dollar amount with thousands separators, e.g. `$1,250,000`.
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
