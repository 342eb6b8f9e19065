//! Lending policy: the thresholds, weights and per-product rules the
//! evaluation engine applies.
//!
//! The policy is injected by the caller (typically loaded from the
//! cooperative's configuration store). Products the policy does not list
//! fall back to the built-in table in [`ProductRule::fallback`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::criteria::LoanType;
use crate::types::*;
use crate::{LendingError, LendingResult};

/// Per-loan-type product rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRule {
    /// Base annual rate in percent before risk surcharges and discounts.
    pub default_rate: Percent,
    /// Largest amount the cooperative lends under this product.
    pub max_amount: Money,
    pub max_term_months: u32,
}

impl ProductRule {
    /// Built-in product table used when the policy has no entry.
    pub fn fallback(loan_type: LoanType) -> Self {
        let (default_rate, max_amount, max_term_months) = match loan_type {
            LoanType::Personal => (dec!(15), dec!(5_000_000), 36),
            LoanType::Mortgage => (dec!(12), dec!(100_000_000), 240),
            LoanType::Auto => (dec!(14), dec!(30_000_000), 60),
            LoanType::Business => (dec!(16), dec!(50_000_000), 60),
            LoanType::Student => (dec!(10), dec!(10_000_000), 48),
            LoanType::Payday => (dec!(25), dec!(1_000_000), 3),
        };
        ProductRule {
            default_rate,
            max_amount,
            max_term_months,
        }
    }
}

/// Risk score coefficients. Points are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    /// Points at the worst credit score, scaled linearly to 0 at the best.
    pub credit: Decimal,
    /// Points at a debt-to-income ratio of 100% or more.
    pub debt_to_income: Decimal,
    pub per_existing_loan: Decimal,
    pub existing_loan_cap: u32,
    /// Points removed when savings cover the full requested amount.
    pub savings_ratio: Decimal,
    /// Points removed at `tenure_cap_months` of account age.
    pub tenure: Decimal,
    pub tenure_cap_months: u32,
    /// Points removed when the member has earned any savings interest.
    pub participation: Decimal,
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            credit: dec!(40),
            debt_to_income: dec!(25),
            per_existing_loan: dec!(3),
            existing_loan_cap: 5,
            savings_ratio: dec!(15),
            tenure: dec!(5),
            tenure_cap_months: 24,
            participation: dec!(2),
        }
    }
}

/// Rate surcharges (percentage points) per risk tier above LOW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSurcharges {
    pub moderate: Percent,
    pub high: Percent,
    pub very_high: Percent,
}

impl Default for TierSurcharges {
    fn default() -> Self {
        TierSurcharges {
            moderate: dec!(2),
            high: dec!(4),
            very_high: dec!(6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// Decimal ratio (0.43 = 43%).
    pub max_debt_to_income: Rate,
    pub min_credit_score: u32,
    /// Decimal ratio, applied only when collateral is supplied.
    pub max_loan_to_value: Rate,
    /// Risk below this is approved in full.
    pub full_approval_risk: Decimal,
    /// Start of the HIGH tier.
    pub high_risk: Decimal,
    /// Risk at or above this is ineligible.
    pub max_eligible_risk: Decimal,
    pub min_interest_rate: Percent,
    /// Rate discount at a savings ratio of 1 or more.
    pub max_savings_discount: Percent,
    pub tier_surcharges: TierSurcharges,
    pub weights: RiskWeights,
    pub products: BTreeMap<LoanType, ProductRule>,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        LendingPolicy {
            max_debt_to_income: dec!(0.43),
            min_credit_score: 500,
            max_loan_to_value: dec!(0.80),
            full_approval_risk: dec!(30),
            high_risk: dec!(50),
            max_eligible_risk: dec!(70),
            min_interest_rate: dec!(5),
            max_savings_discount: dec!(2),
            tier_surcharges: TierSurcharges::default(),
            weights: RiskWeights::default(),
            products: BTreeMap::new(),
        }
    }
}

impl LendingPolicy {
    /// Product rule for `loan_type`, from the policy or the built-in table.
    pub fn product(&self, loan_type: LoanType) -> ProductRule {
        self.products
            .get(&loan_type)
            .cloned()
            .unwrap_or_else(|| ProductRule::fallback(loan_type))
    }

    /// Whether `loan_type` is configured explicitly rather than by fallback.
    pub fn has_product(&self, loan_type: LoanType) -> bool {
        self.products.contains_key(&loan_type)
    }

    /// Copy of this policy with every product listed explicitly.
    pub fn with_all_products(&self) -> LendingPolicy {
        let mut policy = self.clone();
        for lt in LoanType::ALL {
            policy.products.entry(lt).or_insert_with(|| ProductRule::fallback(lt));
        }
        policy
    }

    pub fn validate(&self) -> LendingResult<()> {
        if self.max_debt_to_income <= Decimal::ZERO || self.max_debt_to_income > Decimal::ONE {
            return Err(invalid("max_debt_to_income", "Must be in (0, 1]."));
        }
        if self.max_loan_to_value <= Decimal::ZERO {
            return Err(invalid("max_loan_to_value", "Must be positive."));
        }
        if self.min_credit_score > 850 {
            return Err(invalid("min_credit_score", "Cannot exceed 850."));
        }
        let hundred = dec!(100);
        if !(Decimal::ZERO < self.full_approval_risk
            && self.full_approval_risk < self.high_risk
            && self.high_risk < self.max_eligible_risk
            && self.max_eligible_risk <= hundred)
        {
            return Err(invalid(
                "risk thresholds",
                "Require 0 < full_approval_risk < high_risk < max_eligible_risk <= 100.",
            ));
        }
        if !in_percent_range(self.min_interest_rate) {
            return Err(invalid("min_interest_rate", "Must be in [0, 100]."));
        }
        if !in_percent_range(self.max_savings_discount) {
            return Err(invalid("max_savings_discount", "Must be in [0, 100]."));
        }
        let s = &self.tier_surcharges;
        if s.moderate < Decimal::ZERO
            || s.high < s.moderate
            || s.very_high < s.high
            || s.very_high > hundred
        {
            return Err(invalid(
                "tier_surcharges",
                "Must be in [0, 100] and non-decreasing by tier.",
            ));
        }
        let w = &self.weights;
        let weights = [
            w.credit,
            w.debt_to_income,
            w.per_existing_loan,
            w.savings_ratio,
            w.tenure,
            w.participation,
        ];
        if !weights.iter().all(|x| in_percent_range(*x)) {
            return Err(invalid("weights", "Risk weights must be in [0, 100]."));
        }
        if w.tenure_cap_months == 0 {
            return Err(invalid("weights.tenure_cap_months", "Must be at least 1."));
        }
        for (lt, rule) in &self.products {
            if !in_percent_range(rule.default_rate) {
                return Err(invalid(
                    &format!("products.{lt}.default_rate"),
                    "Must be in [0, 100].",
                ));
            }
            if rule.max_amount <= Decimal::ZERO {
                return Err(invalid(
                    &format!("products.{lt}.max_amount"),
                    "Must be positive.",
                ));
            }
            if rule.max_term_months == 0 {
                return Err(invalid(
                    &format!("products.{lt}.max_term_months"),
                    "Must be at least 1.",
                ));
            }
        }
        Ok(())
    }
}

fn in_percent_range(value: Decimal) -> bool {
    (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value)
}

fn invalid(field: &str, reason: &str) -> LendingError {
    LendingError::InvalidPolicy {
        field: field.into(),
        reason: reason.into(),
    }
}
