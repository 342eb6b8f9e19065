//! Applicant criteria and the single place where missing or out-of-range
//! inputs are given their default values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Credit score assumed when the applicant has no score on file.
pub const DEFAULT_CREDIT_SCORE: u32 = 600;
pub const MIN_CREDIT_SCORE: u32 = 300;
pub const MAX_CREDIT_SCORE: u32 = 850;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    #[default]
    Personal,
    Mortgage,
    Auto,
    Business,
    Student,
    Payday,
}

impl LoanType {
    pub const ALL: [LoanType; 6] = [
        LoanType::Personal,
        LoanType::Mortgage,
        LoanType::Auto,
        LoanType::Business,
        LoanType::Student,
        LoanType::Payday,
    ];
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanType::Personal => write!(f, "personal"),
            LoanType::Mortgage => write!(f, "mortgage"),
            LoanType::Auto => write!(f, "auto"),
            LoanType::Business => write!(f, "business"),
            LoanType::Student => write!(f, "student"),
            LoanType::Payday => write!(f, "payday"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    #[serde(alias = "SALARIED", alias = "FULL_TIME")]
    Employed,
    SelfEmployed,
    #[serde(alias = "PART_TIME")]
    Contract,
    Retired,
    Student,
    Unemployed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl EmploymentStatus {
    /// Risk points added for the income stability this status implies.
    pub fn risk_penalty(&self) -> Decimal {
        match self {
            EmploymentStatus::Employed => Decimal::ZERO,
            EmploymentStatus::SelfEmployed => Decimal::from(3),
            EmploymentStatus::Contract | EmploymentStatus::Retired => Decimal::from(5),
            EmploymentStatus::Student => Decimal::from(8),
            EmploymentStatus::Unknown => Decimal::from(10),
            EmploymentStatus::Unemployed => Decimal::from(15),
        }
    }
}

/// Everything the engine needs to know about one application. Assembled by
/// the caller from the member profile, savings history and active loans.
/// Absent amounts are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanEvaluationCriteria {
    pub requested_amount: Money,
    pub monthly_income: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    pub loan_type: LoanType,
    /// Zero when the applicant has not chosen a term yet.
    pub term_months: u32,
    pub savings_balance: Money,
    pub total_interest_earned: Money,
    /// Age of the member's savings account in months.
    pub savings_account_age: u32,
    pub employment_status: EmploymentStatus,
    pub existing_loan_count: u32,
    /// Monthly installments owed on active loans.
    pub total_active_debt: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_value: Option<Money>,
}

/// Criteria after defaults and range clamps have been applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedCriteria {
    pub requested_amount: Money,
    pub monthly_income: Money,
    pub credit_score: u32,
    pub loan_type: LoanType,
    pub term_months: u32,
    pub savings_balance: Money,
    pub total_interest_earned: Money,
    pub savings_account_age: u32,
    pub employment_status: EmploymentStatus,
    pub existing_loan_count: u32,
    pub total_active_debt: Money,
    pub collateral_value: Option<Money>,
}

impl NormalizedCriteria {
    pub fn debt_to_income(&self) -> Rate {
        ratio_or_zero(self.total_active_debt, self.monthly_income)
    }

    pub fn savings_ratio(&self) -> Rate {
        ratio_or_zero(self.savings_balance, self.requested_amount)
    }

    pub fn loan_to_value(&self) -> Option<Rate> {
        self.collateral_value
            .map(|collateral| ratio_or_zero(self.requested_amount, collateral))
    }
}

pub(crate) fn normalize(
    criteria: &LoanEvaluationCriteria,
    warnings: &mut Vec<String>,
) -> NormalizedCriteria {
    let mut non_negative = |field: &str, value: Money| -> Money {
        if value < Decimal::ZERO {
            warnings.push(format!("{field} was negative ({value}); treated as 0"));
            Decimal::ZERO
        } else {
            value
        }
    };

    let requested_amount = non_negative("requested_amount", criteria.requested_amount);
    let monthly_income = non_negative("monthly_income", criteria.monthly_income);
    let savings_balance = non_negative("savings_balance", criteria.savings_balance);
    let total_interest_earned =
        non_negative("total_interest_earned", criteria.total_interest_earned);
    let total_active_debt = non_negative("total_active_debt", criteria.total_active_debt);

    let collateral_value = match criteria.collateral_value {
        Some(v) if v > Decimal::ZERO => Some(v),
        Some(v) => {
            warnings.push(format!("collateral_value of {v} ignored; LTV not assessed"));
            None
        }
        None => None,
    };

    let credit_score = match criteria.credit_score {
        None => {
            warnings.push(format!(
                "No credit score supplied; assumed {DEFAULT_CREDIT_SCORE}"
            ));
            DEFAULT_CREDIT_SCORE
        }
        Some(s) if s < MIN_CREDIT_SCORE || s > MAX_CREDIT_SCORE => {
            let clamped = s.clamp(MIN_CREDIT_SCORE, MAX_CREDIT_SCORE);
            warnings.push(format!(
                "Credit score {s} outside {MIN_CREDIT_SCORE}-{MAX_CREDIT_SCORE}; clamped to {clamped}"
            ));
            clamped
        }
        Some(s) => s,
    };

    NormalizedCriteria {
        requested_amount,
        monthly_income,
        credit_score,
        loan_type: criteria.loan_type,
        term_months: criteria.term_months,
        savings_balance,
        total_interest_earned,
        savings_account_age: criteria.savings_account_age,
        employment_status: criteria.employment_status,
        existing_loan_count: criteria.existing_loan_count,
        total_active_debt,
        collateral_value,
    }
}
