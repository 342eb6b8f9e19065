use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use sacco_lending_core::amortization::{affordability, schedule};
use sacco_lending_core::LendingError;

fn loan(principal: Decimal, rate: Decimal, term: u32) -> schedule::AmortizationInput {
    schedule::AmortizationInput {
        principal,
        annual_interest_rate: rate,
        term_months: term,
        start_date: None,
    }
}

// ===========================================================================
// Known answers
// ===========================================================================

#[test]
fn test_one_million_at_fifteen_percent_for_a_year() {
    let out = schedule::compute_amortization(&loan(dec!(1_000_000), dec!(15), 12)).unwrap();
    let r = &out.result;

    // Annuity formula: 1,000,000 * 0.0125 * 1.0125^12 / (1.0125^12 - 1) = 90,258.31
    assert!((r.monthly_payment - dec!(90_258)).abs() < dec!(1));
    assert_eq!(r.schedule.len(), 12);
    assert_eq!(r.schedule[11].remaining_balance, Decimal::ZERO);
    assert_eq!(r.total_interest, r.total_payment - dec!(1_000_000));
}

#[test]
fn test_interest_free_loan() {
    let out = schedule::compute_amortization(&loan(dec!(500_000), Decimal::ZERO, 10)).unwrap();
    let r = &out.result;
    assert_eq!(r.monthly_payment, dec!(50_000.00));
    assert!(r.schedule.iter().all(|row| row.interest_amount == Decimal::ZERO));
    assert_eq!(r.schedule[9].remaining_balance, Decimal::ZERO);
}

#[test]
fn test_interest_free_uneven_division() {
    // 100 / 3 = 33.33 per month; the last row clears the extra cent
    let out = schedule::compute_amortization(&loan(dec!(100), Decimal::ZERO, 3)).unwrap();
    let r = &out.result;
    assert_eq!(r.monthly_payment, dec!(33.33));
    assert_eq!(r.rounding_residual, dec!(0.01));
    assert_eq!(r.schedule[2].remaining_balance, Decimal::ZERO);
}

// ===========================================================================
// Properties across a grid of loans
// ===========================================================================

#[test]
fn test_schedule_properties_hold_across_loans() {
    let principals = [dec!(50_000), dec!(1_250_000), dec!(9_999_999.99)];
    let rates = [Decimal::ZERO, dec!(6.5), dec!(18), dec!(36)];
    let terms = [1u32, 7, 24, 120];

    for principal in principals {
        for rate in rates {
            for term in terms {
                let out = schedule::compute_amortization(&loan(principal, rate, term)).unwrap();
                let r = &out.result;

                assert_eq!(r.schedule.len(), term as usize);
                assert_eq!(r.schedule.last().unwrap().remaining_balance, Decimal::ZERO);

                // Cent rounding of the payment compounds like a sinking fund,
                // so drift is bounded by one cent per period grown at the rate.
                let monthly = rate / dec!(1200);
                let tolerance = if monthly.is_zero() {
                    dec!(0.01) * Decimal::from(term)
                } else {
                    dec!(0.01) * ((Decimal::ONE + monthly).powi(i64::from(term)) - Decimal::ONE)
                        / monthly
                };
                let paid: Decimal = r.schedule.iter().map(|row| row.principal_amount).sum();
                assert!(
                    (paid - principal).abs() <= tolerance,
                    "P={principal} r={rate} n={term}: principal paid {paid}"
                );
                assert_eq!(paid + r.rounding_residual, principal);

                let mut prev = principal;
                for row in &r.schedule {
                    assert_eq!(row.total_amount, r.monthly_payment);
                    assert!(row.remaining_balance <= prev);
                    assert_eq!(row.principal_amount + row.interest_amount, row.total_amount);
                    prev = row.remaining_balance;
                }
            }
        }
    }
}

#[test]
fn test_due_dates_follow_start_date() {
    let mut input = loan(dec!(600_000), dec!(12), 14);
    input.start_date = NaiveDate::from_ymd_opt(2025, 8, 31);
    let out = schedule::compute_amortization(&input).unwrap();
    let dates: Vec<String> = out
        .result
        .schedule
        .iter()
        .map(|r| r.due_date.unwrap().to_string())
        .collect();
    assert_eq!(dates[0], "2025-09-30");
    assert_eq!(dates[1], "2025-10-31");
    assert_eq!(dates[5], "2026-02-28");
    assert_eq!(dates[13], "2026-10-31");
}

#[test]
fn test_invalid_parameters_are_typed_errors() {
    let cases = [
        (loan(Decimal::ZERO, dec!(10), 12), "principal"),
        (loan(dec!(1000), dec!(-1), 12), "annual_interest_rate"),
        (loan(dec!(1000), dec!(10), 0), "term_months"),
        (loan(dec!(1000), dec!(10), 5000), "term_months"),
    ];
    for (input, expected) in cases {
        match schedule::compute_amortization(&input).unwrap_err() {
            LendingError::InvalidLoanParameters { field, .. } => assert_eq!(field, expected),
            other => panic!("Expected InvalidLoanParameters, got {other:?}"),
        }
    }
}

#[test]
fn test_json_round_trip_of_input() {
    let json = r#"{"principal": 250000, "annual_interest_rate": 14.5, "term_months": 18, "start_date": "2026-03-15"}"#;
    let input: schedule::AmortizationInput = serde_json::from_str(json).unwrap();
    let out = schedule::compute_amortization(&input).unwrap();
    assert_eq!(out.result.schedule.len(), 18);
    assert_eq!(
        out.result.schedule[0].due_date,
        NaiveDate::from_ymd_opt(2026, 4, 15)
    );
}

// ===========================================================================
// Affordability
// ===========================================================================

#[test]
fn test_affordable_principal_schedules_within_capacity() {
    let input = affordability::AffordabilityInput {
        monthly_income: dec!(2_000_000),
        total_active_debt: dec!(260_000),
        max_debt_to_income: None,
        annual_interest_rate: dec!(15),
        term_months: 36,
    };
    let out = affordability::calculate_affordability(&input).unwrap();
    let cap = out.result.payment_capacity;
    assert_eq!(cap, dec!(600_000.00));

    let sched = schedule::compute_amortization(&loan(out.result.max_principal, dec!(15), 36)).unwrap();
    assert!(sched.result.monthly_payment <= cap);
}
