//! Loan affordability and amortization

mod engine;
mod schedule;

pub use engine::{
    calculate_loan, calculate_loan_with, instalment, LoanConfig, BALANCE_EPSILON, MAX_TERM_MONTHS,
};
pub use schedule::{LoanResult, ScheduleRow};
