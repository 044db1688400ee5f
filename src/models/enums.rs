use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Stage {
    Kyc => "kyc",
    Accreditation => "accreditation",
    Aml => "aml",
    Funds => "funds",
});

impl Stage {
    /// All stages in evaluation order.
    pub const ALL: [Stage; 4] = [Stage::Kyc, Stage::Accreditation, Stage::Aml, Stage::Funds];

    /// Human-facing stage name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Kyc => "KYC verification",
            Stage::Accreditation => "Accreditation check",
            Stage::Aml => "AML screening",
            Stage::Funds => "Proof of funds",
        }
    }
}

str_enum!(StageStatus {
    Incomplete => "incomplete",
    Verified => "verified",
    Rejected => "rejected",
    Flagged => "flagged",
    Pending => "pending",
});

impl StageStatus {
    /// Terminal statuses can only be left through an explicit restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected | Self::Flagged)
    }
}

str_enum!(OverallStatus {
    Complete => "complete",
    Incomplete => "incomplete",
});

str_enum!(IdType {
    Aadhar => "aadhar",
    Pan => "pan",
    Passport => "passport",
    DriversLicense => "drivers_license",
    NationalId => "national_id",
});

impl IdType {
    pub fn label(&self) -> &'static str {
        match self {
            IdType::Aadhar => "Aadhar",
            IdType::Pan => "PAN",
            IdType::Passport => "Passport",
            IdType::DriversLicense => "Driver's License",
            IdType::NationalId => "National ID",
        }
    }
}

str_enum!(AddressProofType {
    UtilityBill => "utility_bill",
    BankStatement => "bank_statement",
    GovernmentLetter => "government_letter",
    RentalAgreement => "rental_agreement",
});

str_enum!(IncomeProofType {
    TaxReturns => "tax_returns",
    W2Form => "w2_form",
    PayStubs => "pay_stubs",
    EmploymentLetter => "employment_letter",
    Other => "other",
});

str_enum!(NetWorthProofType {
    BankStatements => "bank_statements",
    InvestmentStatements => "investment_statements",
    PropertyValuations => "property_valuations",
    CpaLetter => "cpa_letter",
    Other => "other",
});

str_enum!(WealthSource {
    EmploymentIncome => "employment_income",
    BusinessOwnership => "business_ownership",
    Investments => "investments",
    Inheritance => "inheritance",
    RealEstate => "real_estate",
    Other => "other",
});

str_enum!(UploadKind {
    Ids => "ids",
    Selfies => "selfies",
    Documents => "documents",
});

str_enum!(ReviewDecision {
    Approve => "approve",
    Reject => "reject",
});
