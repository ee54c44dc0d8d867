//! Loan output structures

use serde::{Deserialize, Serialize};

use crate::profile::LoanCategory;

/// A single period of the amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period number (1-indexed)
    pub period: u32,
    /// Cash paid this period: interest + principal + fee
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub fee: f64,
    /// Outstanding balance after this period
    pub balance: f64,
}

/// Complete loan calculation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub category: LoanCategory,

    /// Amount financed after deposit and fees
    pub principal: f64,

    /// Periodic (monthly) interest rate as a decimal
    pub monthly_rate: f64,

    /// Residual due at the end of the term (balloon loans only)
    pub balloon_target: f64,

    /// Contractual instalment from the payment formula
    pub instalment: f64,

    /// Instalment plus extra payment plus monthly fees
    pub monthly_payment: f64,

    // Totals from the month-by-month simulation
    pub total_interest: f64,
    pub total_fees: f64,
    pub total_paid: f64,
    pub months: u32,
    pub final_balance: f64,

    /// Period-by-period schedule, empty unless requested
    pub schedule: Vec<ScheduleRow>,
}

impl LoanResult {
    /// Result for a loan that cannot be simulated (nothing financed or no term)
    pub fn empty(category: LoanCategory) -> Self {
        Self {
            category,
            principal: 0.0,
            monthly_rate: 0.0,
            balloon_target: 0.0,
            instalment: 0.0,
            monthly_payment: 0.0,
            total_interest: 0.0,
            total_fees: 0.0,
            total_paid: 0.0,
            months: 0,
            final_balance: 0.0,
            schedule: Vec::new(),
        }
    }

    /// Everything paid beyond the amount financed
    pub fn cost_of_credit(&self) -> f64 {
        self.total_paid - self.principal
    }

    /// Write the schedule as CSV
    pub fn write_schedule_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.schedule {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
