use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::criteria::{normalize, LoanEvaluationCriteria, LoanType};
use super::eligibility::{run_checks, EligibilityCheck};
use super::policy::LendingPolicy;
use super::pricing::{quote_rate, recommend_amount, RateQuote};
use super::risk::{score_risk, RiskBreakdown, RiskTier};
use crate::amortization::affordability::{max_affordable_principal, payment_capacity};
use crate::amortization::schedule::MAX_TERM_MONTHS;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::*;

/// Savings coverage below which members are nudged to save more.
const TARGET_SAVINGS_RATIO: Rate = dec!(0.25);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsImpact {
    pub savings_ratio: Rate,
    pub account_age_months: u32,
    pub total_interest_earned: Money,
    /// Risk points removed for savings, tenure and participation.
    pub risk_reduction: Decimal,
    /// Percentage points taken off the rate.
    pub rate_discount: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanEvaluationResult {
    pub risk_score: Decimal,
    pub risk_tier: RiskTier,
    pub is_eligible: bool,
    pub loan_type: LoanType,
    pub requested_amount: Money,
    pub recommended_amount: Money,
    /// Annual rate in percent.
    pub recommended_interest_rate: Percent,
    pub credit_score_used: u32,
    pub debt_to_income_ratio: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_to_value_ratio: Option<Rate>,
    pub savings_impact: SavingsImpact,
    pub risk_breakdown: RiskBreakdown,
    pub rate_quote: RateQuote,
    pub checks: Vec<EligibilityCheck>,
    pub reasons: Vec<String>,
    pub recommendations: Vec<String>,
    /// Installment on the recommended amount at the recommended rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_monthly_installment: Option<Money>,
    /// Largest principal whose installment fits the remaining DTI headroom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_affordable_amount: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a loan application against `policy`.
///
/// Never fails: an ineligible application is a normal result with
/// `is_eligible == false` and the failing gates listed in `reasons`.
pub fn evaluate_loan_application(
    criteria: &LoanEvaluationCriteria,
    policy: &LendingPolicy,
) -> ComputationOutput<LoanEvaluationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let c = normalize(criteria, &mut warnings);
    let product = policy.product(c.loan_type);
    if !policy.has_product(c.loan_type) {
        warnings.push(format!(
            "No {} product configured; using built-in rate of {}%",
            c.loan_type, product.default_rate
        ));
    }

    // -- Risk ---------------------------------------------------------------
    let breakdown = score_risk(&c, policy);
    let risk_score = breakdown.score();
    let risk_tier = RiskTier::from_score(risk_score, policy);

    // -- Eligibility --------------------------------------------------------
    let checks = run_checks(&c, &product, risk_score, policy);
    let is_eligible = checks.iter().all(|chk| chk.passed);
    let reasons: Vec<String> = checks
        .iter()
        .filter(|chk| !chk.passed)
        .map(|chk| chk.reason.clone())
        .collect();

    // -- Amount and rate ----------------------------------------------------
    let savings_ratio = c.savings_ratio();
    let recommended_amount = recommend_amount(c.requested_amount, risk_score, is_eligible, policy);
    let rate_quote = quote_rate(&product, risk_tier, savings_ratio, policy);
    let rate = rate_quote.rate;

    let schedulable = c.term_months > 0 && c.term_months <= MAX_TERM_MONTHS;
    let estimated_monthly_installment = if is_eligible && schedulable && recommended_amount > Decimal::ZERO {
        level_payment(monthly_rate(rate), c.term_months, recommended_amount)
            .ok()
            .map(round_money)
    } else {
        None
    };
    let max_affordable_amount = if schedulable {
        let capacity = payment_capacity(c.monthly_income, c.total_active_debt, policy.max_debt_to_income);
        max_affordable_principal(capacity, rate, c.term_months).ok()
    } else {
        None
    };

    // -- Recommendations ----------------------------------------------------
    let mut recommendations: Vec<String> = checks
        .iter()
        .filter(|chk| !chk.passed)
        .map(|chk| chk.remedy.clone())
        .collect();

    if is_eligible && recommended_amount < c.requested_amount {
        let share = (ratio_or_zero(recommended_amount, c.requested_amount) * dec!(100)).round_dp(1);
        recommendations.push(format!(
            "Offer reduced to {recommended_amount} ({share}% of the request) for a {risk_tier} risk score of {risk_score}"
        ));
    }
    if let Some(max_affordable) = max_affordable_amount {
        if is_eligible && max_affordable < recommended_amount {
            recommendations.push(format!(
                "Installments on more than {max_affordable} over {} months would push debt-to-income past the limit",
                c.term_months
            ));
        }
    }
    if c.requested_amount > Decimal::ZERO && savings_ratio < TARGET_SAVINGS_RATIO {
        let target = round_money(c.requested_amount * TARGET_SAVINGS_RATIO);
        recommendations.push(format!(
            "Growing savings to {target} (25% of the request) lowers both the risk score and the interest rate"
        ));
    }

    let output = LoanEvaluationResult {
        risk_score,
        risk_tier,
        is_eligible,
        loan_type: c.loan_type,
        requested_amount: c.requested_amount,
        recommended_amount,
        recommended_interest_rate: rate,
        credit_score_used: c.credit_score,
        debt_to_income_ratio: c.debt_to_income().round_dp(4),
        loan_to_value_ratio: c.loan_to_value().map(|r| r.round_dp(4)),
        savings_impact: SavingsImpact {
            savings_ratio: savings_ratio.round_dp(4),
            account_age_months: c.savings_account_age,
            total_interest_earned: c.total_interest_earned,
            risk_reduction: breakdown.savings_reduction().round_dp(2),
            rate_discount: rate_quote.savings_discount,
        },
        risk_breakdown: breakdown,
        rate_quote,
        checks,
        reasons,
        recommendations,
        estimated_monthly_installment,
        max_affordable_amount,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "max_debt_to_income": policy.max_debt_to_income.to_string(),
        "min_credit_score": policy.min_credit_score,
        "max_loan_to_value": policy.max_loan_to_value.to_string(),
        "full_approval_risk": policy.full_approval_risk.to_string(),
        "max_eligible_risk": policy.max_eligible_risk.to_string(),
        "product_source": if policy.has_product(c.loan_type) { "policy" } else { "fallback" },
    });

    with_metadata(
        "SACCO loan evaluation (risk score, hard gates, savings-adjusted pricing)",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
