//! Debt-service headroom sizing.
//!
//! The payment a member can still take on is whatever keeps total monthly
//! obligations at or below the maximum debt-to-income ratio. That payment is
//! converted to a principal with the annuity present-value formula and
//! rounded down to cents, so the resulting installment never exceeds the
//! headroom.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::MAX_TERM_MONTHS;
use crate::time_value::{annuity_present_value, level_payment, monthly_rate};
use crate::types::*;
use crate::{LendingError, LendingResult};

/// Maximum debt-to-income ratio used when the caller does not supply one.
pub const DEFAULT_MAX_DEBT_TO_INCOME: Rate = dec!(0.43);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub monthly_income: Money,
    /// Monthly installments already owed on active loans.
    #[serde(default)]
    pub total_active_debt: Money,
    /// Decimal ratio (0.43 = 43%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_debt_to_income: Option<Rate>,
    /// Annual rate in percent (15 = 15%).
    pub annual_interest_rate: Percent,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    /// Monthly payment that still fits under the DTI ceiling.
    pub payment_capacity: Money,
    pub max_principal: Money,
    /// Level installment on `max_principal`.
    pub monthly_payment_at_max: Money,
    pub current_debt_to_income: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Largest principal a level payment of `payment_capacity` can retire over
/// `term_months` at `annual_interest_rate` percent. Rounded down to cents.
pub fn max_affordable_principal(
    payment_capacity: Money,
    annual_interest_rate: Percent,
    term_months: u32,
) -> LendingResult<Money> {
    if payment_capacity <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let pv = annuity_present_value(monthly_rate(annual_interest_rate), term_months, payment_capacity)?;
    Ok(pv.round_dp_with_strategy(2, RoundingStrategy::ToZero))
}

/// Monthly payment still available before total obligations reach
/// `max_debt_to_income` of income. Never negative.
pub fn payment_capacity(
    monthly_income: Money,
    total_active_debt: Money,
    max_debt_to_income: Rate,
) -> Money {
    round_money(
        monthly_income
            .saturating_mul(max_debt_to_income)
            .saturating_sub(total_active_debt)
            .max(Decimal::ZERO),
    )
}

/// Size the largest new loan a member can service within the DTI ceiling.
pub fn calculate_affordability(
    input: &AffordabilityInput,
) -> LendingResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let max_dti = input.max_debt_to_income.unwrap_or(DEFAULT_MAX_DEBT_TO_INCOME);
    let capacity = payment_capacity(input.monthly_income, input.total_active_debt, max_dti);
    if capacity.is_zero() {
        warnings.push("Existing obligations already use the full debt-to-income allowance".into());
    }

    let max_principal =
        max_affordable_principal(capacity, input.annual_interest_rate, input.term_months)?;
    let monthly_payment_at_max = round_money(level_payment(
        monthly_rate(input.annual_interest_rate),
        input.term_months,
        max_principal,
    )?);

    let output = AffordabilityOutput {
        payment_capacity: capacity,
        max_principal,
        monthly_payment_at_max,
        current_debt_to_income: ratio_or_zero(input.total_active_debt, input.monthly_income),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "max_debt_to_income": max_dti.to_string(),
        "term_months": input.term_months,
    });

    Ok(with_metadata(
        "Affordability sizing (annuity present value of DTI headroom)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &AffordabilityInput) -> LendingResult<()> {
    if input.monthly_income < Decimal::ZERO {
        return Err(LendingError::InvalidLoanParameters {
            field: "monthly_income".into(),
            reason: "Monthly income cannot be negative.".into(),
        });
    }
    if input.total_active_debt < Decimal::ZERO {
        return Err(LendingError::InvalidLoanParameters {
            field: "total_active_debt".into(),
            reason: "Active debt cannot be negative.".into(),
        });
    }
    if let Some(dti) = input.max_debt_to_income {
        if dti <= Decimal::ZERO || dti > Decimal::ONE {
            return Err(LendingError::InvalidLoanParameters {
                field: "max_debt_to_income".into(),
                reason: "Max debt-to-income must be in (0, 1].".into(),
            });
        }
    }
    if input.annual_interest_rate < Decimal::ZERO {
        return Err(LendingError::InvalidLoanParameters {
            field: "annual_interest_rate".into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    if input.term_months == 0 || input.term_months > MAX_TERM_MONTHS {
        return Err(LendingError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {MAX_TERM_MONTHS} months."),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
