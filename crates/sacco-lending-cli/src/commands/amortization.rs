use chrono::NaiveDate;
use clap::Args;
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;

use sacco_lending_core::amortization::affordability::{self, AffordabilityInput};
use sacco_lending_core::amortization::schedule::{self, AmortizationInput};

use crate::input;

/// Arguments for a repayment schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (15 = 15%)
    #[arg(long, alias = "rate")]
    pub annual_interest_rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Disbursement date (YYYY-MM-DD); due dates are omitted without it
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the largest affordable principal
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly income
    #[arg(long, alias = "income")]
    pub monthly_income: Option<Decimal>,

    /// Monthly installments already owed on active loans
    #[arg(long, alias = "debt")]
    pub total_active_debt: Option<Decimal>,

    /// Debt-to-income ceiling as a decimal ratio (0.43 = 43%)
    #[arg(long, alias = "max-dti")]
    pub max_debt_to_income: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_interest_rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("amortization input read from stdin");
        serde_json::from_value(data)?
    } else {
        AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate: args
                .annual_interest_rate
                .ok_or("--annual-interest-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            start_date: args.start_date,
        }
    };

    let result = schedule::compute_amortization(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("affordability input read from stdin");
        serde_json::from_value(data)?
    } else {
        AffordabilityInput {
            monthly_income: args
                .monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            total_active_debt: args.total_active_debt.unwrap_or(Decimal::ZERO),
            max_debt_to_income: args.max_debt_to_income,
            annual_interest_rate: args
                .annual_interest_rate
                .ok_or("--annual-interest-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
        }
    };

    let result = affordability::calculate_affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
