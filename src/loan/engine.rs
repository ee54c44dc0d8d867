//! Loan instalment and amortization engine

use crate::profile::{clean_amount, LoanProfile};
use super::schedule::{LoanResult, ScheduleRow};

/// Balance treated as fully repaid
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Longest term simulated (100 years); longer terms are clamped to it
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Configuration for a loan calculation
#[derive(Debug, Clone)]
pub struct LoanConfig {
    /// Whether to record the period-by-period schedule
    pub detailed_output: bool,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            detailed_output: true,
        }
    }
}

/// Payment that amortizes `principal` down to `future_value` over `term` periods.
///
/// Uses `r * (P - FV / (1+r)^n) / (1 - (1+r)^-n)`. When the rate is zero, or
/// so small that the denominator vanishes, the reduction is spread evenly.
pub fn instalment(principal: f64, monthly_rate: f64, term: u32, future_value: f64) -> f64 {
    if term == 0 {
        return 0.0;
    }

    let even = (principal - future_value) / term as f64;
    if monthly_rate == 0.0 || !monthly_rate.is_finite() {
        return even;
    }

    let growth = (1.0 + monthly_rate).powi(term.min(i32::MAX as u32) as i32);
    let denominator = 1.0 - 1.0 / growth;
    if growth.is_nan() || denominator.abs() < f64::EPSILON {
        return even;
    }

    monthly_rate * (principal - future_value / growth) / denominator
}

/// Calculate a loan with the full schedule
pub fn calculate_loan(profile: &LoanProfile) -> LoanResult {
    calculate_loan_with(profile, &LoanConfig::default())
}

/// Calculate a loan, simulating it month by month
pub fn calculate_loan_with(profile: &LoanProfile, config: &LoanConfig) -> LoanResult {
    let category = profile.category;

    let principal = (clean_amount(profile.amount) - clean_amount(profile.deposit)).max(0.0)
        + clean_amount(profile.financed_fees)
        + clean_amount(category.once_off_fee());
    let term = profile.term_months.min(MAX_TERM_MONTHS);
    if term < profile.term_months {
        log::warn!(
            "term of {} months clamped to {}",
            profile.term_months,
            MAX_TERM_MONTHS
        );
    }

    if principal <= 0.0 || term == 0 {
        return LoanResult::empty(category);
    }

    let monthly_rate = clean_amount(profile.annual_rate_pct) / 100.0 / 12.0;
    let balloon_target = if category.has_balloon() {
        principal * category.residual_pct().clamp(0.0, 100.0) / 100.0
    } else {
        0.0
    };

    let base_instalment = instalment(principal, monthly_rate, term, balloon_target);
    if !base_instalment.is_finite() {
        log::warn!("instalment overflowed for principal {:.2}", principal);
        return LoanResult::empty(category);
    }
    let extra = clean_amount(profile.extra_monthly_payment);
    let fee = clean_amount(category.monthly_fee());

    let mut result = LoanResult {
        category,
        principal,
        monthly_rate,
        balloon_target,
        instalment: base_instalment,
        monthly_payment: base_instalment + extra + fee,
        ..LoanResult::empty(category)
    };

    let mut balance = principal;
    for period in 1..=term {
        let interest = balance * monthly_rate;
        let scheduled_principal = (base_instalment - interest).max(0.0);
        let principal_paid = balance.min(scheduled_principal + extra);
        balance -= principal_paid;

        result.total_interest += interest;
        result.total_fees += fee;
        result.total_paid += interest + principal_paid + fee;
        result.months = period;

        if config.detailed_output {
            result.schedule.push(ScheduleRow {
                period,
                payment: interest + principal_paid + fee,
                interest,
                principal: principal_paid,
                fee,
                balance: balance.max(0.0),
            });
        }

        // Balloon loans run the full term so the residual is left outstanding
        if !category.has_balloon() && balance <= BALANCE_EPSILON {
            break;
        }
    }

    if balance <= BALANCE_EPSILON {
        balance = 0.0;
    }
    result.final_balance = balance;

    // The residual is settled in one payment at the end of a balloon loan
    if category.has_balloon() {
        result.total_paid += balance;
    }

    log::debug!(
        "{} loan {:.2} over {} months: instalment {:.2}, interest {:.2}, {} months simulated",
        category.as_str(),
        principal,
        term,
        base_instalment,
        result.total_interest,
        result.months
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LoanCategory;
    use approx::assert_abs_diff_eq;

    fn loan(amount: f64, rate: f64, term: u32, category: LoanCategory) -> LoanProfile {
        LoanProfile {
            amount,
            annual_rate_pct: rate,
            term_months: term,
            category,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_standard_loan() {
        let result = calculate_loan(&loan(100_000.0, 12.0, 12, LoanCategory::Standard));

        assert_abs_diff_eq!(result.monthly_rate, 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(result.instalment, 8_884.88, epsilon = 0.01);
        assert_abs_diff_eq!(result.total_paid, 106_618.55, epsilon = 0.1);
        assert_abs_diff_eq!(result.total_interest, 6_618.55, epsilon = 0.1);
        assert_eq!(result.months, 12);
        assert_eq!(result.final_balance, 0.0);
        assert_eq!(result.schedule.len(), 12);
        assert_abs_diff_eq!(result.schedule[0].interest, 1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_schedule_rows_are_consistent() {
        let result = calculate_loan(&loan(250_000.0, 11.75, 60, LoanCategory::Standard));
        let mut balance = result.principal;
        for row in &result.schedule {
            assert_abs_diff_eq!(row.payment, row.interest + row.principal + row.fee, epsilon = 1e-9);
            balance -= row.principal;
            assert_abs_diff_eq!(row.balance, balance.max(0.0), epsilon = 1e-6);
        }
        let principal_total: f64 = result.schedule.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal_total, result.principal, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_principal_or_term() {
        for profile in [
            loan(0.0, 12.0, 12, LoanCategory::Standard),
            loan(100_000.0, 12.0, 0, LoanCategory::Standard),
            LoanProfile {
                deposit: 150_000.0,
                ..loan(100_000.0, 12.0, 12, LoanCategory::Standard)
            },
            loan(-5_000.0, 12.0, 12, LoanCategory::Balloon { residual_pct: 30.0 }),
        ] {
            let result = calculate_loan(&profile);
            assert_eq!(result.principal, 0.0);
            assert_eq!(result.instalment, 0.0);
            assert_eq!(result.monthly_payment, 0.0);
            assert_eq!(result.total_interest, 0.0);
            assert_eq!(result.total_paid, 0.0);
            assert_eq!(result.months, 0);
            assert_eq!(result.final_balance, 0.0);
            assert!(result.schedule.is_empty());
        }
    }

    #[test]
    fn test_deposit_and_fees_in_principal() {
        let profile = LoanProfile {
            deposit: 50_000.0,
            financed_fees: 5_000.0,
            ..loan(300_000.0, 10.0, 240, LoanCategory::Standard)
        };
        assert_eq!(calculate_loan(&profile).principal, 255_000.0);

        // Deposit above the price leaves only the fees financed
        let profile = LoanProfile {
            deposit: 400_000.0,
            financed_fees: 5_000.0,
            ..loan(300_000.0, 10.0, 240, LoanCategory::Standard)
        };
        assert_eq!(calculate_loan(&profile).principal, 5_000.0);
    }

    #[test]
    fn test_zero_rate_spreads_evenly() {
        let result = calculate_loan(&loan(12_000.0, 0.0, 12, LoanCategory::Standard));
        assert_eq!(result.instalment, 1_000.0);
        assert_eq!(result.total_interest, 0.0);
        assert_abs_diff_eq!(result.total_paid, 12_000.0, epsilon = 1e-6);
        assert_eq!(result.months, 12);
    }

    #[test]
    fn test_negative_rate_treated_as_zero() {
        let result = calculate_loan(&loan(12_000.0, -5.0, 12, LoanCategory::Standard));
        assert_eq!(result.monthly_rate, 0.0);
        assert_eq!(result.instalment, 1_000.0);
    }

    #[test]
    fn test_extra_payment_shortens_loan() {
        let base = calculate_loan(&loan(100_000.0, 12.0, 12, LoanCategory::Standard));
        let extra = calculate_loan(&LoanProfile {
            extra_monthly_payment: 2_000.0,
            ..loan(100_000.0, 12.0, 12, LoanCategory::Standard)
        });

        assert!(extra.months < base.months);
        assert!(extra.total_interest < base.total_interest);
        assert_eq!(extra.final_balance, 0.0);
        assert_abs_diff_eq!(extra.monthly_payment, base.instalment + 2_000.0, epsilon = 1e-9);
        // The last payment only clears what is left
        let last = extra.schedule.last().unwrap();
        assert!(last.principal < base.instalment + 2_000.0);
    }

    #[test]
    fn test_balloon_leaves_residual() {
        let result = calculate_loan(&loan(
            100_000.0,
            12.0,
            36,
            LoanCategory::Balloon { residual_pct: 30.0 },
        ));

        assert_abs_diff_eq!(result.balloon_target, 30_000.0, epsilon = 1e-9);
        assert_eq!(result.months, 36);
        assert_abs_diff_eq!(result.final_balance, 30_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(
            result.total_paid,
            result.total_interest + result.principal,
            epsilon = 0.01
        );

        let standard = calculate_loan(&loan(100_000.0, 12.0, 36, LoanCategory::Standard));
        assert!(result.instalment < standard.instalment);
    }

    #[test]
    fn test_balloon_extra_payment_reduces_residual() {
        let result = calculate_loan(&LoanProfile {
            extra_monthly_payment: 500.0,
            ..loan(100_000.0, 12.0, 36, LoanCategory::Balloon { residual_pct: 30.0 })
        });
        assert_eq!(result.months, 36);
        assert!(result.final_balance < 30_000.0);
        assert!(result.final_balance > 0.0);
    }

    #[test]
    fn test_balloon_percentage_clamped() {
        let result = calculate_loan(&loan(
            100_000.0,
            12.0,
            12,
            LoanCategory::Balloon { residual_pct: 150.0 },
        ));
        assert_abs_diff_eq!(result.balloon_target, 100_000.0, epsilon = 1e-9);
        // Interest only
        assert_abs_diff_eq!(result.instalment, 1_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fee_bearing_loan() {
        let result = calculate_loan(&loan(
            100_000.0,
            12.0,
            12,
            LoanCategory::FeeBearing {
                initiation_fee: 1_207.5,
                monthly_service_fee: 69.0,
            },
        ));

        assert_eq!(result.principal, 101_207.5);
        assert_abs_diff_eq!(result.monthly_payment, result.instalment + 69.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_fees, 69.0 * 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            result.total_paid,
            result.principal + result.total_interest + result.total_fees,
            epsilon = 0.01
        );
        assert!(result.schedule.iter().all(|r| r.fee == 69.0));
        assert_abs_diff_eq!(
            result.cost_of_credit(),
            result.total_interest + result.total_fees,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_summary_without_schedule() {
        let config = LoanConfig {
            detailed_output: false,
        };
        let result = calculate_loan_with(&loan(100_000.0, 12.0, 12, LoanCategory::Standard), &config);
        assert!(result.schedule.is_empty());
        assert_eq!(result.months, 12);
        assert_abs_diff_eq!(result.total_paid, 106_618.55, epsilon = 0.1);
    }

    fn assert_all_finite(result: &LoanResult) {
        for value in [
            result.principal,
            result.monthly_rate,
            result.balloon_target,
            result.instalment,
            result.monthly_payment,
            result.total_interest,
            result.total_fees,
            result.total_paid,
            result.final_balance,
        ] {
            assert!(value.is_finite(), "non-finite amount in {:?}", result);
        }
        for row in &result.schedule {
            assert!(row.payment.is_finite() && row.balance.is_finite());
        }
    }

    #[test]
    fn test_vanishing_rate_spreads_evenly() {
        let rate = crate::profile::parse_amount("0.0000000000000001");
        assert!(rate > 0.0);

        let result = calculate_loan(&loan(100_000.0, rate, 12, LoanCategory::Standard));
        assert_all_finite(&result);
        assert_abs_diff_eq!(result.instalment, 100_000.0 / 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total_paid, 100_000.0, epsilon = 1e-4);
        assert_eq!(result.final_balance, 0.0);

        assert_abs_diff_eq!(instalment(100_000.0, 8.3e-20, 12, 0.0), 100_000.0 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_rates_treated_as_zero() {
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = calculate_loan(&loan(12_000.0, rate, 12, LoanCategory::Standard));
            assert_all_finite(&result);
            assert_eq!(result.monthly_rate, 0.0);
            assert_eq!(result.instalment, 1_000.0);
        }
        assert_eq!(instalment(12_000.0, f64::NAN, 12, 0.0), 1_000.0);
    }

    #[test]
    fn test_long_term_clamped() {
        assert!(instalment(100_000.0, 0.01, 3_000_000_000, 0.0).is_finite());

        let result = calculate_loan(&loan(100_000.0, 12.0, 3_000_000_000, LoanCategory::Standard));
        assert_all_finite(&result);
        assert!(result.months <= MAX_TERM_MONTHS);
        assert!(result.schedule.len() <= MAX_TERM_MONTHS as usize);
        // 1% a month over 100 years is close to interest only
        assert_abs_diff_eq!(result.instalment, 1_000.0, epsilon = 0.01);

        let balloon = calculate_loan(&loan(
            100_000.0,
            12.0,
            u32::MAX,
            LoanCategory::Balloon { residual_pct: 30.0 },
        ));
        assert_all_finite(&balloon);
        assert_eq!(balloon.months, MAX_TERM_MONTHS);
    }

    #[test]
    fn test_instalment_formula() {
        assert_eq!(instalment(100_000.0, 0.01, 0, 0.0), 0.0);
        assert_abs_diff_eq!(instalment(100_000.0, 0.01, 12, 0.0), 8_884.8788, epsilon = 1e-4);
        assert_abs_diff_eq!(instalment(1_200.0, 0.0, 12, 600.0), 50.0, epsilon = 1e-12);
    }
}
