//! Amortization schedule for a fixed-rate, level-payment monthly loan.
//!
//! Every currency figure on a schedule row is rounded to cents as the row is
//! built, so rows sum the way they are displayed. The last installment always
//! closes the loan; the few cents of rounding drift it absorbs are reported as
//! `rounding_residual` (positive when the rows under-repaid the principal,
//! negative when they over-repaid it), so that
//! `sum(principal_amount) + rounding_residual == principal`.
//!
//! Due dates are `start_date + i` calendar months, each computed from the
//! start date. When the start day does not exist in the target month the due
//! date falls on that month's last day (Jan 31 -> Feb 28 -> Mar 31).

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::{level_payment, monthly_rate};
use crate::types::*;
use crate::{LendingError, LendingResult};

/// Longest term the engine will schedule (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual rate in percent (15 = 15%).
    pub annual_interest_rate: Percent,
    pub term_months: u32,
    /// Reference date due dates are counted from, usually the disbursement date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleItem {
    pub installment_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub total_amount: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub monthly_rate: Rate,
    pub schedule: Vec<PaymentScheduleItem>,
    /// Principal minus the sum of scheduled principal, cleared at the last row.
    pub rounding_residual: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the level monthly payment and the full amortization schedule.
pub fn compute_amortization(
    input: &AmortizationInput,
) -> LendingResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let rate = monthly_rate(input.annual_interest_rate);
    let term = input.term_months;
    let monthly_payment = round_money(level_payment(rate, term, input.principal)?);

    if monthly_payment.is_zero() {
        return Err(LendingError::InvalidLoanParameters {
            field: "principal".into(),
            reason: format!("Principal is too small to amortize over {term} months"),
        });
    }
    if rate.is_zero() {
        warnings.push("Zero interest rate: straight-line principal repayment".into());
    }

    let total_payment = monthly_payment
        .checked_mul(Decimal::from(term))
        .ok_or_else(|| LendingError::InvalidLoanParameters {
            field: "principal".into(),
            reason: format!("Total of {term} installments exceeds decimal range"),
        })?;

    let (schedule, rounding_residual) =
        build_schedule(input.principal, rate, monthly_payment, term, input.start_date)?;

    if !rounding_residual.is_zero() {
        warnings.push(format!(
            "Cent rounding left {rounding_residual} against principal, cleared at installment {term}"
        ));
    }

    let output = AmortizationOutput {
        monthly_payment,
        total_payment,
        total_interest: total_payment - input.principal,
        monthly_rate: rate,
        schedule,
        rounding_residual,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "rounding": "2dp, midpoint away from zero, per row",
        "month_end_policy": "clamp to last day of month",
        "start_date": input.start_date.map(|d| d.to_string()),
    });

    Ok(with_metadata(
        "Level-payment amortization (annuity formula)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Due date of installment `installment` counted from `start`.
pub fn due_date(start: NaiveDate, installment: u32) -> LendingResult<NaiveDate> {
    start
        .checked_add_months(Months::new(installment))
        .ok_or_else(|| {
            LendingError::DateError(format!(
                "Installment {installment} from {start} falls outside the supported date range"
            ))
        })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_schedule(
    principal: Money,
    rate: Rate,
    monthly_payment: Money,
    term: u32,
    start_date: Option<NaiveDate>,
) -> LendingResult<(Vec<PaymentScheduleItem>, Money)> {
    let mut schedule = Vec::with_capacity(term as usize);
    let mut balance = principal;
    let mut residual = Decimal::ZERO;

    for n in 1..=term {
        let interest = round_money(balance * rate);
        let principal_part = monthly_payment - interest;

        let closing = if n == term {
            residual = balance - principal_part;
            Decimal::ZERO
        } else {
            (balance - principal_part).max(Decimal::ZERO)
        };

        let due = match start_date {
            Some(d) => Some(due_date(d, n)?),
            None => None,
        };

        schedule.push(PaymentScheduleItem {
            installment_number: n,
            due_date: due,
            principal_amount: principal_part,
            interest_amount: interest,
            total_amount: monthly_payment,
            remaining_balance: closing,
        });

        balance = closing;
    }

    Ok((schedule, residual))
}

fn validate_input(input: &AmortizationInput) -> LendingResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(LendingError::InvalidLoanParameters {
            field: "principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if input.annual_interest_rate < Decimal::ZERO {
        return Err(LendingError::InvalidLoanParameters {
            field: "annual_interest_rate".into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    if input.term_months == 0 {
        return Err(LendingError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: "Term must be at least 1 month.".into(),
        });
    }
    if input.term_months > MAX_TERM_MONTHS {
        return Err(LendingError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months."),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn loan(principal: Decimal, rate: Decimal, term: u32) -> AmortizationInput {
        AmortizationInput {
            principal,
            annual_interest_rate: rate,
            term_months: term,
            start_date: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fifteen_percent_twelve_months() {
        let out = compute_amortization(&loan(dec!(1_000_000), dec!(15), 12)).unwrap();
        let r = &out.result;
        assert_eq!(r.monthly_payment, dec!(90_258.31));
        assert_eq!(r.schedule.len(), 12);
        assert_eq!(r.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
        assert_eq!(r.total_payment, dec!(1_083_099.72));
        assert_eq!(r.total_interest, dec!(83_099.72));
        // Twelve rounded rows repay 999,999.98; the last row clears the rest.
        assert_eq!(r.rounding_residual, dec!(0.02));
    }

    #[test]
    fn test_first_row_split() {
        let out = compute_amortization(&loan(dec!(1_000_000), dec!(15), 12)).unwrap();
        let first = &out.result.schedule[0];
        // 1,000,000 * 0.0125 = 12,500 interest
        assert_eq!(first.interest_amount, dec!(12_500.00));
        assert_eq!(first.principal_amount, dec!(77_758.31));
        assert_eq!(first.remaining_balance, dec!(922_241.69));
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let out = compute_amortization(&loan(dec!(500_000), Decimal::ZERO, 10)).unwrap();
        let r = &out.result;
        assert_eq!(r.monthly_payment, dec!(50_000.00));
        assert_eq!(r.total_interest, Decimal::ZERO);
        assert!(r.schedule.iter().all(|row| row.interest_amount.is_zero()));
        assert!(r.schedule.iter().all(|row| row.principal_amount == dec!(50_000)));
        assert_eq!(r.rounding_residual, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_total_amount_constant_and_balance_non_increasing() {
        let out = compute_amortization(&loan(dec!(3_750_000), dec!(18.5), 36)).unwrap();
        let r = &out.result;
        let mut prev = dec!(3_750_000);
        for row in &r.schedule {
            assert_eq!(row.total_amount, r.monthly_payment);
            assert!(row.remaining_balance <= prev);
            prev = row.remaining_balance;
        }
        assert_eq!(prev, Decimal::ZERO);
    }

    #[test]
    fn test_principal_sums_to_loan_amount() {
        let principal = dec!(2_345_678.90);
        let out = compute_amortization(&loan(principal, dec!(13.25), 48)).unwrap();
        let paid: Decimal = out.result.schedule.iter().map(|r| r.principal_amount).sum();
        assert!((paid - principal).abs() <= dec!(0.50), "paid {paid}");
        assert_eq!(paid + out.result.rounding_residual, principal);
    }

    #[test]
    fn test_installment_numbers_are_one_based() {
        let out = compute_amortization(&loan(dec!(10_000), dec!(12), 6)).unwrap();
        let numbers: Vec<u32> = out.result.schedule.iter().map(|r| r.installment_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_single_installment() {
        let out = compute_amortization(&loan(dec!(100_000), dec!(12), 1)).unwrap();
        let row = &out.result.schedule[0];
        assert_eq!(row.total_amount, dec!(101_000.00));
        assert_eq!(row.interest_amount, dec!(1_000.00));
        assert_eq!(row.principal_amount, dec!(100_000.00));
        assert_eq!(row.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_due_dates_clamp_month_end() {
        let mut input = loan(dec!(90_000), dec!(12), 3);
        input.start_date = Some(ymd(2025, 1, 31));
        let out = compute_amortization(&input).unwrap();
        let dates: Vec<NaiveDate> = out
            .result
            .schedule
            .iter()
            .map(|r| r.due_date.unwrap())
            .collect();
        assert_eq!(dates, vec![ymd(2025, 2, 28), ymd(2025, 3, 31), ymd(2025, 4, 30)]);
    }

    #[test]
    fn test_due_dates_leap_february() {
        assert_eq!(due_date(ymd(2024, 1, 31), 1).unwrap(), ymd(2024, 2, 29));
        assert_eq!(due_date(ymd(2024, 1, 15), 12).unwrap(), ymd(2025, 1, 15));
    }

    #[test]
    fn test_no_start_date_means_no_due_dates() {
        let out = compute_amortization(&loan(dec!(90_000), dec!(12), 3)).unwrap();
        assert!(out.result.schedule.iter().all(|r| r.due_date.is_none()));
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        for principal in [Decimal::ZERO, dec!(-1)] {
            let err = compute_amortization(&loan(principal, dec!(10), 12)).unwrap_err();
            match err {
                LendingError::InvalidLoanParameters { field, .. } => assert_eq!(field, "principal"),
                other => panic!("Expected InvalidLoanParameters, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = compute_amortization(&loan(dec!(1_000), dec!(10), 0)).unwrap_err();
        match err {
            LendingError::InvalidLoanParameters { field, .. } => assert_eq!(field, "term_months"),
            other => panic!("Expected InvalidLoanParameters, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = compute_amortization(&loan(dec!(1_000), dec!(-0.5), 12)).unwrap_err();
        match err {
            LendingError::InvalidLoanParameters { field, .. } => {
                assert_eq!(field, "annual_interest_rate")
            }
            other => panic!("Expected InvalidLoanParameters, got {other:?}"),
        }
    }

    #[test]
    fn test_dust_principal_rejected() {
        assert!(compute_amortization(&loan(dec!(0.01), dec!(1), 12)).is_err());
    }

    #[test]
    fn test_totals_beyond_decimal_range_rejected() {
        let err = compute_amortization(&loan(Decimal::MAX, dec!(36), 120)).unwrap_err();
        match err {
            LendingError::InvalidLoanParameters { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidLoanParameters, got {other:?}"),
        }
    }

    #[test]
    fn test_due_date_past_calendar_range_is_date_error() {
        assert!(matches!(
            due_date(NaiveDate::MAX, 1),
            Err(LendingError::DateError(_))
        ));

        let mut input = loan(dec!(10_000), dec!(12), 3);
        input.start_date = NaiveDate::MAX.checked_sub_months(Months::new(1));
        let err = compute_amortization(&input).unwrap_err();
        assert!(matches!(err, LendingError::DateError(_)), "got {err:?}");
    }

    #[test]
    fn test_metadata_populated() {
        let out = compute_amortization(&loan(dec!(1_000), dec!(10), 12)).unwrap();
        assert!(!out.methodology.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
