//! Annual income tax engine
//!
//! Runs the SARS calculation for a single profile against one rate table:
//! travel inclusion, retirement cap, bracket tax, age rebates, then the two
//! medical credits. Pure and infallible; unusable inputs count as zero.

use chrono::{Local, NaiveDate};

use crate::profile::{clean_amount, resolve_age, TaxProfile, DEFAULT_AGE};
use crate::rates::{MedicalCredits, RateTable, Rebates, RetirementCap};
use super::result::{RebateBreakdown, TaxResult};

/// Share of a travel allowance that is taxable when business use is at least 80%
pub const TRAVEL_INCLUSION_MOSTLY_BUSINESS: f64 = 0.20;
/// Share of a travel allowance that is taxable otherwise
pub const TRAVEL_INCLUSION_STANDARD: f64 = 0.80;

/// Age from which the secondary rebate and enhanced medical credit apply
pub const SECONDARY_REBATE_AGE: u32 = 65;
/// Age from which the tertiary rebate applies
pub const TERTIARY_REBATE_AGE: u32 = 75;

/// Months in a year of assessment
const MONTHS: f64 = 12.0;

/// Configuration for a tax calculation
#[derive(Debug, Clone)]
pub struct TaxConfig {
    /// Date ages are measured at
    pub as_at: NaiveDate,

    /// Age used when neither an age nor a usable ID number is supplied
    pub default_age: u32,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::as_at(Local::now().date_naive())
    }
}

impl TaxConfig {
    /// Configuration measuring ages at a fixed date
    pub fn as_at(as_at: NaiveDate) -> Self {
        Self {
            as_at,
            default_age: DEFAULT_AGE,
        }
    }
}

/// Tax engine bound to one year's rates
pub struct TaxEngine<'a> {
    table: &'a RateTable,
    config: TaxConfig,
}

impl<'a> TaxEngine<'a> {
    /// Create a new engine with the given rate table and config
    pub fn new(table: &'a RateTable, config: TaxConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &RateTable {
        self.table
    }

    pub fn config(&self) -> &TaxConfig {
        &self.config
    }

    /// Run the calculation for one profile
    pub fn calculate(&self, profile: &TaxProfile) -> TaxResult {
        let table = self.table;

        let age = resolve_age(
            profile.age,
            profile.id_number.as_deref(),
            self.config.as_at,
            self.config.default_age,
        );

        let income = clean_amount(profile.annual_income);
        let taxable_travel =
            taxable_travel(clean_amount(profile.travel_allowance), profile.travel_mostly_business);

        let retirement_income_base = income + taxable_travel;
        let retirement_deduction = retirement_deduction(
            profile.retirement_contribution,
            retirement_income_base,
            &table.retirement_cap,
        );
        let taxable_income = (retirement_income_base - retirement_deduction).max(0.0);

        let tax_before_rebates = table.bracket_tax(taxable_income);
        let rebates = rebates_for_age(age, &table.rebates);
        let tax_after_rebates = (tax_before_rebates - rebates.total).max(0.0);

        let months = profile.covered_months();
        let medical_credit_monthly =
            medical_credit_monthly(profile.medical_dependents, &table.medical_credits);
        let medical_credit_annual = medical_credit_monthly * months as f64;

        let additional_medical_credit = additional_medical_credit(
            age >= SECONDARY_REBATE_AGE || profile.disabled,
            profile.medical_contributions(),
            medical_credit_annual,
            clean_amount(profile.out_of_pocket_medical),
            taxable_income,
        );

        let annual_tax =
            (tax_after_rebates - medical_credit_annual - additional_medical_credit).max(0.0);
        let monthly_tax = round_cents(annual_tax / MONTHS);
        let effective_rate = if taxable_income > 0.0 {
            annual_tax / taxable_income
        } else {
            0.0
        };

        log::debug!(
            "{}: age {} taxable {:.2} normal tax {:.2} rebates {:.2} credits {:.2}/{:.2} -> {:.2}",
            table.year,
            age,
            taxable_income,
            tax_before_rebates,
            rebates.total,
            medical_credit_annual,
            additional_medical_credit,
            annual_tax
        );

        TaxResult {
            tax_year: table.year,
            age,
            taxable_travel,
            retirement_income_base,
            retirement_deduction,
            taxable_income,
            tax_before_rebates,
            rebates,
            tax_after_rebates,
            medical_credit_monthly,
            medical_credit_annual,
            additional_medical_credit,
            annual_tax,
            monthly_tax,
            effective_rate,
        }
    }
}

/// Calculate tax with ages measured at today's date
pub fn calculate_tax(profile: &TaxProfile, table: &RateTable) -> TaxResult {
    TaxEngine::new(table, TaxConfig::default()).calculate(profile)
}

/// Calculate tax with ages measured at a fixed date
pub fn calculate_tax_as_at(profile: &TaxProfile, table: &RateTable, as_at: NaiveDate) -> TaxResult {
    TaxEngine::new(table, TaxConfig::as_at(as_at)).calculate(profile)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Taxable portion of a travel allowance, to the nearest rand
pub fn taxable_travel(allowance: f64, mostly_business: bool) -> f64 {
    let inclusion = if mostly_business {
        TRAVEL_INCLUSION_MOSTLY_BUSINESS
    } else {
        TRAVEL_INCLUSION_STANDARD
    };
    (clean_amount(allowance) * inclusion).round()
}

/// Deductible part of a retirement contribution:
/// min(contribution, income base x cap %, ceiling)
pub fn retirement_deduction(contribution: f64, income_base: f64, cap: &RetirementCap) -> f64 {
    clean_amount(contribution)
        .min(clean_amount(income_base) * cap.percentage)
        .min(cap.ceiling)
        .max(0.0)
}

/// Rebates for an age; the secondary and tertiary rebates stack
pub fn rebates_for_age(age: u32, rebates: &Rebates) -> RebateBreakdown {
    let primary = rebates.primary;
    let secondary = if age >= SECONDARY_REBATE_AGE { rebates.secondary } else { 0.0 };
    let tertiary = if age >= TERTIARY_REBATE_AGE { rebates.tertiary } else { 0.0 };

    RebateBreakdown {
        primary,
        secondary,
        tertiary,
        total: primary + secondary + tertiary,
    }
}

/// Monthly Medical Schemes Fees Tax Credit for a number of covered people
pub fn medical_credit_monthly(dependents: u32, credits: &MedicalCredits) -> f64 {
    let first_two = dependents.min(2) as f64 * credits.first_two;
    let additional = dependents.saturating_sub(2) as f64 * credits.additional;
    first_two + additional
}

/// Additional Medical Expenses Tax Credit
///
/// Enhanced (65+ or disability): a third of out-of-pocket expenses plus
/// contributions above three times the MTC.
/// Otherwise: a quarter of out-of-pocket expenses plus contributions above
/// four times the MTC, less 7.5% of taxable income.
pub fn additional_medical_credit(
    enhanced: bool,
    contributions: f64,
    annual_mtc: f64,
    out_of_pocket: f64,
    taxable_income: f64,
) -> f64 {
    let (multiplier, rate) = if enhanced { (3.0, 1.0 / 3.0) } else { (4.0, 0.25) };

    let excess_contributions = (clean_amount(contributions) - multiplier * annual_mtc).max(0.0);
    let mut qualifying = clean_amount(out_of_pocket) + excess_contributions;
    if !enhanced {
        qualifying = (qualifying - 0.075 * clean_amount(taxable_income)).max(0.0);
    }

    rate * qualifying
}
