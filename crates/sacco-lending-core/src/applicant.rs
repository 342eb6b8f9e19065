//! Assembly of [`LoanEvaluationCriteria`] from a member's raw records.
//!
//! The cooperative's systems hold savings accounts and loans as separate
//! records; these helpers aggregate them the way the evaluation engine
//! expects. Account ages are measured against a caller-supplied `as_of` date.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::evaluation::criteria::{EmploymentStatus, LoanEvaluationCriteria, LoanType};
use crate::types::*;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsAccountRecord {
    pub balance: Money,
    #[serde(default)]
    pub interest_earned: Money,
    pub opened_on: NaiveDate,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Disbursed,
    Active,
    Overdue,
    Repaid,
    Closed,
    Rejected,
    WrittenOff,
}

impl LoanStatus {
    /// Whether the member is currently servicing this loan.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LoanStatus::Disbursed | LoanStatus::Active | LoanStatus::Overdue)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub status: LoanStatus,
    pub monthly_installment: Money,
    #[serde(default)]
    pub outstanding_balance: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantProfile {
    #[serde(default)]
    pub monthly_income: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: Money,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_value: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaAssemblyInput {
    pub request: LoanRequest,
    #[serde(default)]
    pub profile: ApplicantProfile,
    #[serde(default)]
    pub savings_accounts: Vec<SavingsAccountRecord>,
    #[serde(default)]
    pub loans: Vec<LoanRecord>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub account_count: u32,
    pub total_balance: Money,
    pub total_interest_earned: Money,
    pub oldest_account_age_months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLoanSummary {
    pub active_loan_count: u32,
    pub total_monthly_obligation: Money,
    pub total_outstanding_balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Whole calendar months from `from` to `to`, 0 if `to` precedes `from`.
///
/// A month is complete once `from + n months` (month-end clamped, as for
/// due dates) is on or before `to`, so Jan 31 -> Feb 28 counts as one month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let span = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut months = span.max(0) as u32;
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(d) if d <= to => break,
            _ => months -= 1,
        }
    }
    months
}

/// Sum of `amounts`, pinned at the Decimal bounds instead of overflowing.
fn saturating_total(amounts: impl Iterator<Item = Money>) -> Money {
    amounts.fold(Decimal::ZERO, |acc, x| acc.saturating_add(x))
}

/// Aggregate open savings accounts as of `as_of`.
pub fn summarize_savings(accounts: &[SavingsAccountRecord], as_of: NaiveDate) -> SavingsSummary {
    let open: Vec<&SavingsAccountRecord> = accounts.iter().filter(|a| !a.closed).collect();

    SavingsSummary {
        account_count: open.len() as u32,
        total_balance: saturating_total(open.iter().map(|a| a.balance)),
        total_interest_earned: saturating_total(open.iter().map(|a| a.interest_earned)),
        oldest_account_age_months: open
            .iter()
            .map(|a| months_between(a.opened_on, as_of))
            .max()
            .unwrap_or(0),
    }
}

/// Count loans still being serviced and total their monthly installments.
pub fn summarize_active_loans(loans: &[LoanRecord]) -> ActiveLoanSummary {
    let active: Vec<&LoanRecord> = loans.iter().filter(|l| l.status.is_outstanding()).collect();

    ActiveLoanSummary {
        active_loan_count: active.len() as u32,
        total_monthly_obligation: saturating_total(active.iter().map(|l| l.monthly_installment)),
        total_outstanding_balance: saturating_total(active.iter().map(|l| l.outstanding_balance)),
    }
}

/// Build evaluation criteria from a request, the member profile and the
/// member's savings and loan records.
pub fn assemble_criteria(
    input: &CriteriaAssemblyInput,
) -> ComputationOutput<LoanEvaluationCriteria> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let future_accounts = input
        .savings_accounts
        .iter()
        .filter(|a| !a.closed && a.opened_on > input.as_of)
        .count();
    if future_accounts > 0 {
        warnings.push(format!(
            "{future_accounts} savings account(s) opened after {}; counted with age 0",
            input.as_of
        ));
    }

    let savings = summarize_savings(&input.savings_accounts, input.as_of);
    let loans = summarize_active_loans(&input.loans);

    if savings.account_count == 0 {
        warnings.push("Member has no open savings account".into());
    }
    let bounds = [Decimal::MAX, Decimal::MIN];
    if bounds.contains(&savings.total_balance) || bounds.contains(&savings.total_interest_earned) {
        warnings.push("Savings totals exceed decimal range; capped".into());
    }
    if bounds.contains(&loans.total_monthly_obligation) || bounds.contains(&loans.total_outstanding_balance) {
        warnings.push("Loan totals exceed decimal range; capped".into());
    }

    let output = LoanEvaluationCriteria {
        requested_amount: input.request.amount,
        monthly_income: input.profile.monthly_income,
        credit_score: input.profile.credit_score,
        loan_type: input.request.loan_type,
        term_months: input.request.term_months,
        savings_balance: savings.total_balance,
        total_interest_earned: savings.total_interest_earned,
        savings_account_age: savings.oldest_account_age_months,
        employment_status: input.profile.employment_status,
        existing_loan_count: loans.active_loan_count,
        total_active_debt: loans.total_monthly_obligation,
        collateral_value: input.request.collateral_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of.to_string(),
        "savings_accounts": savings.account_count,
        "active_loans": loans.active_loan_count,
        "outstanding_balance": loans.total_outstanding_balance.to_string(),
    });

    with_metadata(
        "Criteria assembly from savings and loan records",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(balance: Decimal, interest: Decimal, opened_on: NaiveDate) -> SavingsAccountRecord {
        SavingsAccountRecord {
            balance,
            interest_earned: interest,
            opened_on,
            closed: false,
        }
    }

    fn loan(status: LoanStatus, installment: Decimal) -> LoanRecord {
        LoanRecord {
            status,
            monthly_installment: installment,
            outstanding_balance: installment * dec!(10),
        }
    }

    #[test]
    fn test_months_between_whole_months() {
        assert_eq!(months_between(ymd(2024, 1, 15), ymd(2026, 1, 15)), 24);
        assert_eq!(months_between(ymd(2024, 1, 15), ymd(2026, 1, 14)), 23);
        assert_eq!(months_between(ymd(2024, 3, 1), ymd(2024, 3, 31)), 0);
    }

    #[test]
    fn test_months_between_month_end() {
        assert_eq!(months_between(ymd(2025, 1, 31), ymd(2025, 2, 28)), 1);
        assert_eq!(months_between(ymd(2025, 1, 31), ymd(2025, 2, 27)), 0);
    }

    #[test]
    fn test_months_between_reversed_is_zero() {
        assert_eq!(months_between(ymd(2026, 5, 1), ymd(2025, 5, 1)), 0);
    }

    #[test]
    fn test_savings_summary_skips_closed_accounts() {
        let mut closed = account(dec!(999_999), dec!(1), ymd(2010, 1, 1));
        closed.closed = true;
        let accounts = vec![
            account(dec!(300_000), dec!(12_000), ymd(2023, 6, 1)),
            account(dec!(150_000), Decimal::ZERO, ymd(2025, 1, 1)),
            closed,
        ];
        let s = summarize_savings(&accounts, ymd(2025, 6, 1));
        assert_eq!(
            s,
            SavingsSummary {
                account_count: 2,
                total_balance: dec!(450_000),
                total_interest_earned: dec!(12_000),
                oldest_account_age_months: 24,
            }
        );
    }

    #[test]
    fn test_active_loans_exclude_settled_and_pending() {
        let loans = vec![
            loan(LoanStatus::Active, dec!(50_000)),
            loan(LoanStatus::Overdue, dec!(20_000)),
            loan(LoanStatus::Repaid, dec!(70_000)),
            loan(LoanStatus::Pending, dec!(10_000)),
            loan(LoanStatus::Disbursed, dec!(5_000)),
        ];
        let s = summarize_active_loans(&loans);
        assert_eq!(s.active_loan_count, 3);
        assert_eq!(s.total_monthly_obligation, dec!(75_000));
        assert_eq!(s.total_outstanding_balance, dec!(750_000));
    }

    #[test]
    fn test_assemble_criteria() {
        let input = CriteriaAssemblyInput {
            request: LoanRequest {
                amount: dec!(1_000_000),
                loan_type: LoanType::Business,
                term_months: 24,
                collateral_value: None,
            },
            profile: ApplicantProfile {
                monthly_income: dec!(1_200_000),
                credit_score: Some(710),
                employment_status: EmploymentStatus::SelfEmployed,
            },
            savings_accounts: vec![account(dec!(400_000), dec!(8_000), ymd(2024, 2, 10))],
            loans: vec![loan(LoanStatus::Active, dec!(60_000))],
            as_of: ymd(2026, 2, 10),
        };
        let out = assemble_criteria(&input);
        let c = &out.result;
        assert_eq!(c.requested_amount, dec!(1_000_000));
        assert_eq!(c.loan_type, LoanType::Business);
        assert_eq!(c.savings_balance, dec!(400_000));
        assert_eq!(c.total_interest_earned, dec!(8_000));
        assert_eq!(c.savings_account_age, 24);
        assert_eq!(c.existing_loan_count, 1);
        assert_eq!(c.total_active_debt, dec!(60_000));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_assemble_warns_without_savings() {
        let json = r#"{
            "request": { "amount": "250000" },
            "as_of": "2026-01-01"
        }"#;
        let input: CriteriaAssemblyInput = serde_json::from_str(json).unwrap();
        let out = assemble_criteria(&input);
        assert_eq!(out.result.savings_account_age, 0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let big = LoanRecord {
            status: LoanStatus::Active,
            monthly_installment: Decimal::MAX,
            outstanding_balance: Decimal::MAX,
        };
        let input = CriteriaAssemblyInput {
            request: LoanRequest {
                amount: dec!(100_000),
                loan_type: LoanType::Personal,
                term_months: 12,
                collateral_value: None,
            },
            profile: ApplicantProfile {
                monthly_income: dec!(50_000),
                credit_score: Some(700),
                employment_status: EmploymentStatus::Employed,
            },
            savings_accounts: vec![
                account(Decimal::MAX, Decimal::ZERO, ymd(2024, 1, 1)),
                account(Decimal::MAX, Decimal::ZERO, ymd(2024, 1, 1)),
            ],
            loans: vec![big.clone(), big],
            as_of: ymd(2026, 1, 1),
        };
        let out = assemble_criteria(&input);
        assert_eq!(out.result.savings_balance, Decimal::MAX);
        assert_eq!(out.result.total_active_debt, Decimal::MAX);
        assert_eq!(out.warnings.len(), 2);
    }
}
