//! Format checks for identity documents and bank details.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::IdType;

static AADHAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{12}$").unwrap());
static PAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap());
static PASSPORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{8,12}$").unwrap());
static ACCOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10,17}$").unwrap());
static ROUTING_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCheck {
    pub valid: bool,
    pub message: String,
}

/// Validate an ID number against the pattern for its document type.
/// Types without a known pattern always pass.
pub fn check_id_format(id_type: IdType, id_number: &str) -> IdCheck {
    let pattern = match id_type {
        IdType::Aadhar => &*AADHAR_PATTERN,
        IdType::Pan => &*PAN_PATTERN,
        IdType::Passport => &*PASSPORT_PATTERN,
        IdType::DriversLicense | IdType::NationalId => {
            return IdCheck {
                valid: true,
                message: "Format check not available for this ID type".into(),
            };
        }
    };

    let valid = pattern.is_match(id_number);
    let message = if valid {
        format!("Valid {} format", id_type.label())
    } else {
        format!("Invalid {} format", id_type.label())
    };
    IdCheck { valid, message }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankValidation {
    pub account_valid: bool,
    pub routing_valid: bool,
    pub bank_name_present: bool,
    pub checks: Vec<String>,
}

impl BankValidation {
    pub fn valid(&self) -> bool {
        self.account_valid && self.routing_valid && self.bank_name_present
    }
}

/// Check bank details. An empty routing number is accepted.
pub fn validate_bank_details(account_number: &str, routing_number: &str, bank_name: &str) -> BankValidation {
    let account_valid = ACCOUNT_PATTERN.is_match(account_number);
    let routing_valid = routing_number.is_empty() || ROUTING_PATTERN.is_match(routing_number);
    let bank_name = bank_name.trim();
    let bank_name_present = !bank_name.is_empty();

    let mut checks = Vec::with_capacity(3);
    checks.push(if account_valid {
        "Account number format is valid".to_string()
    } else {
        "Account number format is invalid".to_string()
    });
    checks.push(if routing_valid {
        "Routing number format is valid".to_string()
    } else {
        "Routing number format is invalid".to_string()
    });
    if bank_name_present {
        checks.push(format!("Bank name provided: {bank_name}"));
    }

    BankValidation {
        account_valid,
        routing_valid,
        bank_name_present,
        checks,
    }
}

/// Last four characters of a sensitive number (the whole value if shorter).
pub fn last_four(value: &str) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(4)).collect()
}

/// True when the trimmed value has content.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
