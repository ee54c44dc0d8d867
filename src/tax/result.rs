//! Tax calculation output structures

use serde::{Deserialize, Serialize};

use crate::rates::TaxYear;

/// Rebates granted, by age tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RebateBreakdown {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
    pub total: f64,
}

/// Full breakdown of an income tax calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Year of the rate table used
    pub tax_year: TaxYear,

    /// Age the rebates and medical credits were based on
    pub age: u32,

    // Income
    pub taxable_travel: f64,
    pub retirement_income_base: f64,
    pub retirement_deduction: f64,
    pub taxable_income: f64,

    // Normal tax and rebates
    pub tax_before_rebates: f64,
    pub rebates: RebateBreakdown,
    pub tax_after_rebates: f64,

    // Medical credits
    pub medical_credit_monthly: f64,
    pub medical_credit_annual: f64,
    pub additional_medical_credit: f64,

    // Liability
    pub annual_tax: f64,
    pub monthly_tax: f64,
    pub effective_rate: f64,
}

impl TaxResult {
    /// Both medical credits combined
    pub fn total_medical_credits(&self) -> f64 {
        self.medical_credit_annual + self.additional_medical_credit
    }

    /// Income left after tax, based on the qualifying income before deductions
    pub fn annual_after_tax(&self) -> f64 {
        self.retirement_income_base - self.annual_tax
    }
}
