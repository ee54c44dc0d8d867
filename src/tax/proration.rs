//! Pro-rating tax inputs for partial years and partial months

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::profile::TaxProfile;
use crate::rates::RateTable;
use super::engine::calculate_tax_as_at;
use super::result::TaxResult;

/// Days worked in a month that was only partly worked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthFraction {
    pub days_worked: u32,
    pub days_in_month: u32,
}

impl MonthFraction {
    /// Fraction of the month worked, clamped to [0, 1]; zero for an empty month
    pub fn fraction(&self) -> f64 {
        day_fraction(self.days_worked, self.days_in_month)
    }
}

/// `days_worked / days_in_month` clamped to [0, 1], zero when the month has no days
pub fn day_fraction(days_worked: u32, days_in_month: u32) -> f64 {
    if days_in_month == 0 {
        return 0.0;
    }
    (days_worked as f64 / days_in_month as f64).clamp(0.0, 1.0)
}

/// Number of days in a calendar month, zero for an invalid month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(0)
}

/// Employment covering only part of a year of assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialYear {
    /// Calendar months worked in full
    pub full_months: u32,
    /// Partly worked first month
    pub first_month: Option<MonthFraction>,
    /// Partly worked last month
    pub last_month: Option<MonthFraction>,
}

impl PartialYear {
    /// Employment from `start` to `end`, both inclusive.
    ///
    /// The first and last calendar months are recorded as day fractions even
    /// when fully worked; months strictly between them count as full months.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            return Self::default();
        }

        let start_dim = days_in_month(start.year(), start.month());

        if (start.year(), start.month()) == (end.year(), end.month()) {
            return Self {
                full_months: 0,
                first_month: Some(MonthFraction {
                    days_worked: end.day() - start.day() + 1,
                    days_in_month: start_dim,
                }),
                last_month: None,
            };
        }

        let month_index = |d: NaiveDate| d.year() * 12 + d.month0() as i32;
        let full_months = (month_index(end) - month_index(start) - 1).max(0) as u32;

        Self {
            full_months,
            first_month: Some(MonthFraction {
                days_worked: start_dim - start.day() + 1,
                days_in_month: start_dim,
            }),
            last_month: Some(MonthFraction {
                days_worked: end.day(),
                days_in_month: days_in_month(end.year(), end.month()),
            }),
        }
    }

    /// Fraction of a twelve-month year worked, clamped to [0, 1]
    pub fn factor(&self) -> f64 {
        let first = self.first_month.map(|m| m.fraction()).unwrap_or(0.0);
        let last = self.last_month.map(|m| m.fraction()).unwrap_or(0.0);
        ((self.full_months as f64 + first + last) / 12.0).clamp(0.0, 1.0)
    }
}

/// Scale the income-type inputs of a profile (income, travel allowance,
/// retirement contribution, out-of-pocket medical) by `factor`.
/// Medical scheme premiums, counts and flags are left as they are.
pub fn prorate_profile(profile: &TaxProfile, factor: f64) -> TaxProfile {
    let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };

    TaxProfile {
        annual_income: profile.annual_income * factor,
        travel_allowance: profile.travel_allowance * factor,
        retirement_contribution: profile.retirement_contribution * factor,
        out_of_pocket_medical: profile.out_of_pocket_medical * factor,
        ..profile.clone()
    }
}

/// PAYE for a month that was only partly worked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPaye {
    /// Share of the month worked
    pub fraction: f64,
    /// PAYE to withhold for the month
    pub paye: f64,
    /// Calculation on the scaled profile
    pub result: TaxResult,
}

/// Estimate PAYE for a partly worked month.
///
/// Income-type amounts are scaled by the days worked while the medical
/// scheme premium stays at its full monthly value, so the full-month medical
/// credit is preserved.
pub fn estimate_monthly_paye(
    profile: &TaxProfile,
    table: &RateTable,
    as_at: NaiveDate,
    days_worked: u32,
    days_in_month: u32,
) -> MonthlyPaye {
    let fraction = day_fraction(days_worked, days_in_month);
    let scaled = prorate_profile(profile, fraction);
    let result = calculate_tax_as_at(&scaled, table, as_at);

    log::debug!(
        "PAYE for {}/{} days: {:.2}",
        days_worked,
        days_in_month,
        result.monthly_tax
    );

    MonthlyPaye {
        fraction,
        paye: result.monthly_tax,
        result,
    }
}
