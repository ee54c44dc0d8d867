//! SA Calculators - South African income tax (PAYE) and loan affordability engines
//!
//! This library provides:
//! - Year-versioned SARS rate tables (built in, or loaded from CSV)
//! - Annual and monthly PAYE with age rebates, medical credits and retirement deductions
//! - Age derivation from SA identity numbers
//! - Loan instalments and amortization for standard, balloon and fee-bearing loans
//! - Batch runs over many profiles

pub mod rates;
pub mod profile;
pub mod tax;
pub mod loan;
pub mod scenario;

// Re-export commonly used types
pub use rates::{RateTable, RateTables, RatesError, TaxYear};
pub use profile::{LoanCategory, LoanProfile, TaxProfile};
pub use tax::{calculate_tax, TaxConfig, TaxEngine, TaxResult};
pub use loan::{calculate_loan, LoanConfig, LoanResult, ScheduleRow};
pub use scenario::ScenarioRunner;
