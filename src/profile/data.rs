//! Calculator input records

use serde::{Deserialize, Serialize};

use super::amount::clean_amount;

/// Financial profile for an income tax calculation
///
/// Every amount is annual unless the name says otherwise. Missing values
/// default to zero, which the engine treats as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxProfile {
    /// Annual base income (salary, excluding travel allowance)
    pub annual_income: f64,

    /// 13-digit SA identity number, only used to derive age
    pub id_number: Option<String>,

    /// Explicit age; takes precedence over the identity number
    pub age: Option<u32>,

    /// People covered by the medical scheme, main member included
    pub medical_dependents: u32,

    /// Monthly medical scheme premium
    pub medical_premium_monthly: f64,

    /// Months of the year the scheme was paid for (clamped to 0-12)
    pub medical_months: u32,

    /// Qualifying medical expenses not covered by the scheme
    pub out_of_pocket_medical: f64,

    /// Taxpayer or a dependant has a disability
    pub disabled: bool,

    /// Annual retirement fund contribution (pension, provident, RA)
    pub retirement_contribution: f64,

    /// Annual travel allowance
    pub travel_allowance: f64,

    /// Employer is satisfied that at least 80% of travel is for business
    pub travel_mostly_business: bool,
}

impl TaxProfile {
    /// Profile with only a base income
    pub fn new(annual_income: f64) -> Self {
        Self {
            annual_income,
            ..Default::default()
        }
    }

    /// Annual medical scheme contributions actually paid
    pub fn medical_contributions(&self) -> f64 {
        clean_amount(self.medical_premium_monthly) * self.covered_months() as f64
    }

    /// Months covered, clamped to a single year
    pub fn covered_months(&self) -> u32 {
        self.medical_months.min(12)
    }
}

/// Loan product type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanCategory {
    /// Fully amortizing over the term
    #[default]
    Standard,
    /// Leaves a residual (balloon) percentage of the principal due at the end
    Balloon {
        /// Residual as a percentage of the financed principal (e.g. 30.0)
        residual_pct: f64,
    },
    /// Charges a financed initiation fee and a monthly service fee
    FeeBearing {
        /// Once-off fee added to the principal
        initiation_fee: f64,
        /// Fee charged with every instalment
        monthly_service_fee: f64,
    },
}

impl LoanCategory {
    /// Once-off fee financed into the principal
    pub fn once_off_fee(&self) -> f64 {
        match self {
            LoanCategory::FeeBearing { initiation_fee, .. } => *initiation_fee,
            _ => 0.0,
        }
    }

    /// Fee charged every month on top of the instalment
    pub fn monthly_fee(&self) -> f64 {
        match self {
            LoanCategory::FeeBearing {
                monthly_service_fee,
                ..
            } => *monthly_service_fee,
            _ => 0.0,
        }
    }

    /// Residual percentage, zero for loans without a balloon
    pub fn residual_pct(&self) -> f64 {
        match self {
            LoanCategory::Balloon { residual_pct } => *residual_pct,
            _ => 0.0,
        }
    }

    pub fn has_balloon(&self) -> bool {
        matches!(self, LoanCategory::Balloon { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Standard => "standard",
            LoanCategory::Balloon { .. } => "balloon",
            LoanCategory::FeeBearing { .. } => "fee_bearing",
        }
    }
}

/// Inputs for a loan affordability calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanProfile {
    /// Purchase price or requested loan amount
    pub amount: f64,

    /// Deposit paid up front
    pub deposit: f64,

    /// Once-off fees added to the loan (registration, bond fees, ...)
    pub financed_fees: f64,

    /// Annual interest rate as a percentage (11.75 = 11.75%)
    pub annual_rate_pct: f64,

    /// Loan term in months
    pub term_months: u32,

    pub category: LoanCategory,

    /// Voluntary extra payment made every month
    pub extra_monthly_payment: f64,
}
