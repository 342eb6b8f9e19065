use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LendingError;
use crate::types::{Money, Percent, Rate};
use crate::LendingResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage rate (15 = 15%) to a monthly decimal rate.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / dec!(100) / MONTHS_PER_YEAR
}

/// Compound growth factor (1 + r)^n.
fn growth_factor(rate: Rate, nper: u32) -> LendingResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| LendingError::InvalidLoanParameters {
            field: "annual_interest_rate".into(),
            reason: format!("Compounding over {nper} periods overflows decimal precision"),
        })
}

fn overflow(field: &str) -> LendingError {
    LendingError::InvalidLoanParameters {
        field: field.into(),
        reason: "Amount too large to compute at decimal precision".into(),
    }
}

/// Level payment that retires `principal` over `nper` periods.
///
/// `M = P * r(1+r)^n / ((1+r)^n - 1)`; straight-line `P / n` when `r == 0`.
/// Unrounded; callers round at presentation points.
pub fn level_payment(rate: Rate, nper: u32, principal: Money) -> LendingResult<Money> {
    if nper == 0 {
        return Err(LendingError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LendingError::InvalidLoanParameters {
            field: "annual_interest_rate".into(),
            reason: "Rate too small to amortize at decimal precision".into(),
        });
    }

    // (P * r) * f / (f - 1) keeps the intermediate product small.
    factor
        .checked_div(denominator)
        .and_then(|ratio| principal.checked_mul(rate)?.checked_mul(ratio))
        .ok_or_else(|| overflow("principal"))
}

/// Present value of `nper` level payments, i.e. the principal a payment of
/// `payment` can service.
pub fn annuity_present_value(rate: Rate, nper: u32, payment: Money) -> LendingResult<Money> {
    if nper == 0 {
        return Err(LendingError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(nper))
            .ok_or_else(|| overflow("payment"));
    }

    let factor = growth_factor(rate, nper)?;
    payment
        .checked_mul((factor - Decimal::ONE) / factor)
        .and_then(|discounted| discounted.checked_div(rate))
        .ok_or_else(|| overflow("payment"))
}
