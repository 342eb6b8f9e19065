//! Rate and amount recommendations.
//!
//! Rate = product default + tier surcharge - savings discount, floored at the
//! policy minimum. The discount grows linearly with the savings ratio up to
//! full coverage of the request.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::policy::{LendingPolicy, ProductRule};
use super::risk::RiskTier;
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuote {
    pub base_rate: Percent,
    pub tier_surcharge: Percent,
    pub savings_discount: Percent,
    /// Recommended annual rate in percent.
    pub rate: Percent,
}

pub(crate) fn tier_surcharge(tier: RiskTier, policy: &LendingPolicy) -> Percent {
    match tier {
        RiskTier::Low => Decimal::ZERO,
        RiskTier::Moderate => policy.tier_surcharges.moderate,
        RiskTier::High => policy.tier_surcharges.high,
        RiskTier::VeryHigh => policy.tier_surcharges.very_high,
    }
}

pub(crate) fn savings_discount(savings_ratio: Rate, policy: &LendingPolicy) -> Percent {
    policy
        .max_savings_discount
        .saturating_mul(savings_ratio.max(Decimal::ZERO).min(Decimal::ONE))
}

pub(crate) fn quote_rate(
    product: &ProductRule,
    tier: RiskTier,
    savings_ratio: Rate,
    policy: &LendingPolicy,
) -> RateQuote {
    let surcharge = tier_surcharge(tier, policy);
    let discount = savings_discount(savings_ratio, policy).round_dp(2);
    let rate = product
        .default_rate
        .saturating_add(surcharge)
        .saturating_sub(discount)
        .max(policy.min_interest_rate)
        .round_dp(2);

    RateQuote {
        base_rate: product.default_rate,
        tier_surcharge: surcharge,
        savings_discount: discount,
        rate,
    }
}

/// Amount to offer. Ineligible applications get nothing; low-risk ones get
/// the full request; the rest get the request scaled down linearly from the
/// full-approval threshold (factor 1) toward a risk of 100 (factor 0).
/// Rounded down to cents so it never exceeds the request.
pub(crate) fn recommend_amount(
    requested: Money,
    risk_score: Decimal,
    eligible: bool,
    policy: &LendingPolicy,
) -> Money {
    if !eligible || requested <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if risk_score < policy.full_approval_risk {
        return requested;
    }

    let hundred = Decimal::ONE_HUNDRED;
    let factor = ratio_or_zero(hundred - risk_score, hundred - policy.full_approval_risk)
        .max(Decimal::ZERO)
        .min(Decimal::ONE);

    (requested * factor)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
        .min(requested)
}
