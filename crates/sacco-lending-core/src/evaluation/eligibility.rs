//! Hard eligibility gates. Each gate is evaluated and reported whether it
//! passes or not, so the caller can show every reason an application failed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::criteria::NormalizedCriteria;
use super::policy::{LendingPolicy, ProductRule};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityGate {
    MonthlyIncome,
    DebtToIncome,
    CreditScore,
    RequestedAmount,
    LoanCeiling,
    Term,
    LoanToValue,
    RiskScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityCheck {
    pub gate: EligibilityGate,
    pub passed: bool,
    pub actual: Decimal,
    pub limit: Decimal,
    /// Why the gate failed; empty when it passed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// What would clear the gate; empty when it passed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remedy: String,
}

impl EligibilityCheck {
    fn pass(gate: EligibilityGate, actual: Decimal, limit: Decimal) -> Self {
        EligibilityCheck {
            gate,
            passed: true,
            actual,
            limit,
            reason: String::new(),
            remedy: String::new(),
        }
    }

    fn fail(
        gate: EligibilityGate,
        actual: Decimal,
        limit: Decimal,
        reason: String,
        remedy: String,
    ) -> Self {
        EligibilityCheck {
            gate,
            passed: false,
            actual,
            limit,
            reason,
            remedy,
        }
    }
}

/// Ratio as percentage points with exactly two decimals, for reason text.
fn pct(ratio: Rate) -> Decimal {
    let mut value = ratio.saturating_mul(dec!(100)).round_dp(2);
    value.rescale(2);
    value
}

/// Run every hard gate plus the risk ceiling.
pub(crate) fn run_checks(
    c: &NormalizedCriteria,
    product: &ProductRule,
    risk_score: Decimal,
    policy: &LendingPolicy,
) -> Vec<EligibilityCheck> {
    use EligibilityGate::*;

    let mut checks = Vec::with_capacity(8);

    checks.push(if c.monthly_income > Decimal::ZERO {
        EligibilityCheck::pass(MonthlyIncome, c.monthly_income, Decimal::ZERO)
    } else {
        EligibilityCheck::fail(
            MonthlyIncome,
            c.monthly_income,
            Decimal::ZERO,
            "No monthly income on record".into(),
            "Provide proof of a regular monthly income".into(),
        )
    });

    let dti = c.debt_to_income();
    checks.push(if dti <= policy.max_debt_to_income {
        EligibilityCheck::pass(DebtToIncome, dti, policy.max_debt_to_income)
    } else {
        let excess = round_money(
            c.total_active_debt
                .saturating_sub(policy.max_debt_to_income.saturating_mul(c.monthly_income)),
        );
        EligibilityCheck::fail(
            DebtToIncome,
            dti,
            policy.max_debt_to_income,
            format!(
                "Debt-to-income ratio of {}% exceeds the maximum of {}%",
                pct(dti),
                pct(policy.max_debt_to_income)
            ),
            format!("Reduce monthly debt obligations by at least {excess}"),
        )
    });

    let score = Decimal::from(c.credit_score);
    let floor = Decimal::from(policy.min_credit_score);
    checks.push(if c.credit_score >= policy.min_credit_score {
        EligibilityCheck::pass(CreditScore, score, floor)
    } else {
        EligibilityCheck::fail(
            CreditScore,
            score,
            floor,
            format!(
                "Credit score of {} is below the minimum of {}",
                c.credit_score, policy.min_credit_score
            ),
            format!("Improve the credit score to at least {}", policy.min_credit_score),
        )
    });

    checks.push(if c.requested_amount > Decimal::ZERO {
        EligibilityCheck::pass(RequestedAmount, c.requested_amount, Decimal::ZERO)
    } else {
        EligibilityCheck::fail(
            RequestedAmount,
            c.requested_amount,
            Decimal::ZERO,
            "No loan amount requested".into(),
            "Enter the amount to borrow".into(),
        )
    });

    checks.push(if c.requested_amount <= product.max_amount {
        EligibilityCheck::pass(LoanCeiling, c.requested_amount, product.max_amount)
    } else {
        EligibilityCheck::fail(
            LoanCeiling,
            c.requested_amount,
            product.max_amount,
            format!(
                "Requested amount of {} exceeds the {} loan limit of {}",
                c.requested_amount, c.loan_type, product.max_amount
            ),
            format!("Reduce the request to at most {}", product.max_amount),
        )
    });

    if c.term_months > 0 {
        let term = Decimal::from(c.term_months);
        let max_term = Decimal::from(product.max_term_months);
        checks.push(if c.term_months <= product.max_term_months {
            EligibilityCheck::pass(Term, term, max_term)
        } else {
            EligibilityCheck::fail(
                Term,
                term,
                max_term,
                format!(
                    "Term of {} months exceeds the {} loan maximum of {} months",
                    c.term_months, c.loan_type, product.max_term_months
                ),
                format!("Choose a term of {} months or less", product.max_term_months),
            )
        });
    }

    if let (Some(ltv), Some(collateral)) = (c.loan_to_value(), c.collateral_value) {
        checks.push(if ltv <= policy.max_loan_to_value {
            EligibilityCheck::pass(LoanToValue, ltv, policy.max_loan_to_value)
        } else {
            let supported = round_money(collateral.saturating_mul(policy.max_loan_to_value));
            EligibilityCheck::fail(
                LoanToValue,
                ltv,
                policy.max_loan_to_value,
                format!(
                    "Loan-to-value ratio of {}% exceeds the maximum of {}%",
                    pct(ltv),
                    pct(policy.max_loan_to_value)
                ),
                format!("Pledge more collateral or reduce the request to at most {supported}"),
            )
        });
    }

    checks.push(if risk_score < policy.max_eligible_risk {
        EligibilityCheck::pass(RiskScore, risk_score, policy.max_eligible_risk)
    } else {
        EligibilityCheck::fail(
            RiskScore,
            risk_score,
            policy.max_eligible_risk,
            format!(
                "Risk score of {} is at or above the maximum of {}",
                risk_score, policy.max_eligible_risk
            ),
            "Lower risk by clearing existing loans or building savings with the cooperative"
                .into(),
        )
    });

    checks
}
