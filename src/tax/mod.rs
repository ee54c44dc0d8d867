//! South African income tax (PAYE) calculation

mod engine;
mod result;
mod proration;

pub use engine::{
    additional_medical_credit, calculate_tax, calculate_tax_as_at, medical_credit_monthly,
    rebates_for_age, retirement_deduction, taxable_travel, TaxConfig, TaxEngine,
    SECONDARY_REBATE_AGE, TERTIARY_REBATE_AGE,
};
pub use result::{RebateBreakdown, TaxResult};
pub use proration::{
    day_fraction, days_in_month, estimate_monthly_paye, prorate_profile, MonthFraction,
    MonthlyPaye, PartialYear,
};
