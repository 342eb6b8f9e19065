//! Risk scoring.
//!
//! The score runs from 0 (best) to 100 (worst). Base risk is built from the
//! credit score, debt-to-income, existing loans and employment. Savings held
//! with the cooperative then earn the member a reduction: coverage of the
//! request, account tenure, and participation (any interest earned).
//!
//! Every component is non-increasing in credit score and in savings, so a
//! better score or more savings can never raise the result.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::criteria::{NormalizedCriteria, MAX_CREDIT_SCORE, MIN_CREDIT_SCORE};
use super::policy::LendingPolicy;

const MAX_RISK: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Moderate => write!(f, "Moderate"),
            RiskTier::High => write!(f, "High"),
            RiskTier::VeryHigh => write!(f, "Very High"),
        }
    }
}

impl RiskTier {
    pub fn from_score(score: Decimal, policy: &LendingPolicy) -> Self {
        if score < policy.full_approval_risk {
            RiskTier::Low
        } else if score < policy.high_risk {
            RiskTier::Moderate
        } else if score < policy.max_eligible_risk {
            RiskTier::High
        } else {
            RiskTier::VeryHigh
        }
    }
}

/// Points contributed by each factor. Reductions are reported as positive
/// numbers subtracted from the base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub credit_points: Decimal,
    pub debt_to_income_points: Decimal,
    pub existing_loan_points: Decimal,
    pub employment_points: Decimal,
    pub savings_coverage_reduction: Decimal,
    pub tenure_reduction: Decimal,
    pub participation_reduction: Decimal,
}

impl RiskBreakdown {
    pub fn base(&self) -> Decimal {
        self.credit_points
            .saturating_add(self.debt_to_income_points)
            .saturating_add(self.existing_loan_points)
            .saturating_add(self.employment_points)
    }

    pub fn savings_reduction(&self) -> Decimal {
        self.savings_coverage_reduction
            .saturating_add(self.tenure_reduction)
            .saturating_add(self.participation_reduction)
    }

    /// Final score clamped to 0..=100, rounded to 2 dp.
    pub fn score(&self) -> Decimal {
        self.base()
            .saturating_sub(self.savings_reduction())
            .max(Decimal::ZERO)
            .min(MAX_RISK)
            .round_dp(2)
    }
}

pub(crate) fn score_risk(c: &NormalizedCriteria, policy: &LendingPolicy) -> RiskBreakdown {
    let w = &policy.weights;

    let score_span = Decimal::from(MAX_CREDIT_SCORE - MIN_CREDIT_SCORE);
    let credit_gap = Decimal::from(MAX_CREDIT_SCORE.saturating_sub(c.credit_score));
    let credit_points = w.credit.saturating_mul(credit_gap) / score_span;

    let debt_to_income_points = w.debt_to_income.saturating_mul(c.debt_to_income().min(Decimal::ONE));

    let loans = c.existing_loan_count.min(w.existing_loan_cap);
    let existing_loan_points = w.per_existing_loan.saturating_mul(Decimal::from(loans));

    let employment_points = c.employment_status.risk_penalty();

    let savings_coverage_reduction = w.savings_ratio.saturating_mul(c.savings_ratio().min(Decimal::ONE));

    let tenure_cap = w.tenure_cap_months.max(1);
    let tenure = c.savings_account_age.min(tenure_cap);
    let tenure_reduction = w.tenure.saturating_mul(Decimal::from(tenure)) / Decimal::from(tenure_cap);

    let participation_reduction = if c.total_interest_earned > Decimal::ZERO {
        w.participation
    } else {
        Decimal::ZERO
    };

    RiskBreakdown {
        credit_points,
        debt_to_income_points,
        existing_loan_points,
        employment_points,
        savings_coverage_reduction,
        tenure_reduction,
        participation_reduction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::criteria::{normalize, EmploymentStatus, LoanEvaluationCriteria};
    use rust_decimal_macros::dec;

    fn normalized(criteria: LoanEvaluationCriteria) -> NormalizedCriteria {
        normalize(&criteria, &mut Vec::new())
    }

    fn applicant() -> LoanEvaluationCriteria {
        LoanEvaluationCriteria {
            requested_amount: dec!(1_000_000),
            monthly_income: dec!(800_000),
            credit_score: Some(650),
            employment_status: EmploymentStatus::Employed,
            total_active_debt: dec!(100_000),
            existing_loan_count: 1,
            savings_balance: dec!(200_000),
            savings_account_age: 12,
            ..Default::default()
        }
    }

    #[test]
    fn test_breakdown_components() {
        let b = score_risk(&normalized(applicant()), &LendingPolicy::default());
        // (850 - 650) / 550 * 40
        assert_eq!(b.credit_points, dec!(40) * dec!(200) / dec!(550));
        // 100k / 800k = 0.125 * 25
        assert_eq!(b.debt_to_income_points, dec!(3.125));
        assert_eq!(b.existing_loan_points, dec!(3));
        assert_eq!(b.employment_points, Decimal::ZERO);
        // 0.2 * 15
        assert_eq!(b.savings_coverage_reduction, dec!(3.0));
        // 12 / 24 * 5
        assert_eq!(b.tenure_reduction, dec!(2.5));
        assert_eq!(b.participation_reduction, Decimal::ZERO);
    }

    #[test]
    fn test_best_profile_scores_zero() {
        let criteria = LoanEvaluationCriteria {
            credit_score: Some(850),
            savings_balance: dec!(2_000_000),
            savings_account_age: 60,
            total_interest_earned: dec!(10_000),
            ..applicant()
        };
        let mut c = normalized(criteria);
        c.total_active_debt = Decimal::ZERO;
        c.existing_loan_count = 0;
        assert_eq!(score_risk(&c, &LendingPolicy::default()).score(), Decimal::ZERO);
    }

    #[test]
    fn test_worst_profile_is_capped() {
        let criteria = LoanEvaluationCriteria {
            requested_amount: dec!(1_000_000),
            monthly_income: dec!(100),
            credit_score: Some(300),
            employment_status: EmploymentStatus::Unemployed,
            existing_loan_count: 12,
            total_active_debt: dec!(1_000_000),
            ..Default::default()
        };
        let b = score_risk(&normalized(criteria), &LendingPolicy::default());
        // 40 + 25 + 15 + 15
        assert_eq!(b.base(), dec!(95));
        assert!(b.score() <= MAX_RISK);
    }

    #[test]
    fn test_higher_credit_score_never_raises_risk() {
        let policy = LendingPolicy::default();
        let mut prev = MAX_RISK;
        for score in (300..=850).step_by(25) {
            let criteria = LoanEvaluationCriteria {
                credit_score: Some(score),
                ..applicant()
            };
            let risk = score_risk(&normalized(criteria), &policy).score();
            assert!(risk <= prev, "score {score}: {risk} > {prev}");
            prev = risk;
        }
    }

    #[test]
    fn test_more_savings_never_raises_risk() {
        let policy = LendingPolicy::default();
        let mut prev = MAX_RISK;
        for savings in [0, 100_000, 250_000, 500_000, 1_000_000, 3_000_000] {
            let criteria = LoanEvaluationCriteria {
                savings_balance: Decimal::from(savings),
                ..applicant()
            };
            let risk = score_risk(&normalized(criteria), &policy).score();
            assert!(risk <= prev);
            prev = risk;
        }
    }

    #[test]
    fn test_tier_bands() {
        let policy = LendingPolicy::default();
        assert_eq!(RiskTier::from_score(dec!(0), &policy), RiskTier::Low);
        assert_eq!(RiskTier::from_score(dec!(29.99), &policy), RiskTier::Low);
        assert_eq!(RiskTier::from_score(dec!(30), &policy), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(dec!(50), &policy), RiskTier::High);
        assert_eq!(RiskTier::from_score(dec!(70), &policy), RiskTier::VeryHigh);
    }
}
