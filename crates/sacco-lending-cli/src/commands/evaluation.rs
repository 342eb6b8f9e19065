use clap::Args;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use sacco_lending_core::evaluation::{self, LoanEvaluationCriteria};

use crate::input;

/// Arguments for scoring a loan application
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON criteria file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Lending policy file (.json, .yaml or .yml)
    #[arg(long)]
    pub policy: Option<String>,

    /// Amount the member is asking for
    #[arg(long, alias = "amount")]
    pub requested_amount: Option<Decimal>,

    /// Monthly income
    #[arg(long, alias = "income")]
    pub monthly_income: Option<Decimal>,

    /// Bureau credit score (300-850); 600 when omitted
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Product: personal, mortgage, auto, business, student, payday
    #[arg(long)]
    pub loan_type: Option<String>,

    /// Requested term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Current savings balance
    #[arg(long)]
    pub savings_balance: Option<Decimal>,

    /// Interest earned on savings to date
    #[arg(long)]
    pub total_interest_earned: Option<Decimal>,

    /// Age of the savings account in months
    #[arg(long)]
    pub savings_account_age: Option<u32>,

    /// employed, self_employed, contract, retired, student, unemployed
    #[arg(long, alias = "employment")]
    pub employment_status: Option<String>,

    /// Number of loans currently being serviced
    #[arg(long)]
    pub existing_loan_count: Option<u32>,

    /// Monthly installments owed on active loans
    #[arg(long, alias = "debt")]
    pub total_active_debt: Option<Decimal>,

    /// Market value of pledged collateral
    #[arg(long)]
    pub collateral_value: Option<Decimal>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = input::policy::load_policy(args.policy.as_deref())?;

    let criteria: LoanEvaluationCriteria = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("evaluation criteria read from stdin");
        serde_json::from_value(data)?
    } else {
        LoanEvaluationCriteria {
            requested_amount: args
                .requested_amount
                .ok_or("--requested-amount is required (or provide --input)")?,
            monthly_income: args
                .monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            credit_score: args.credit_score,
            loan_type: parse_code(args.loan_type.as_deref(), "--loan-type")?.unwrap_or_default(),
            term_months: args.term_months.unwrap_or(0),
            savings_balance: args.savings_balance.unwrap_or(Decimal::ZERO),
            total_interest_earned: args.total_interest_earned.unwrap_or(Decimal::ZERO),
            savings_account_age: args.savings_account_age.unwrap_or(0),
            employment_status: parse_code(args.employment_status.as_deref(), "--employment-status")?
                .unwrap_or_default(),
            existing_loan_count: args.existing_loan_count.unwrap_or(0),
            total_active_debt: args.total_active_debt.unwrap_or(Decimal::ZERO),
            collateral_value: args.collateral_value,
        }
    };

    let result = evaluation::evaluate_loan_application(&criteria, &policy);
    info!(
        "evaluated {} application: eligible={} risk={}",
        result.result.loan_type, result.result.is_eligible, result.result.risk_score
    );
    Ok(serde_json::to_value(result)?)
}

/// Parse a lowercase flag value into one of the core's upper-case coded enums.
pub(crate) fn parse_code<T: DeserializeOwned>(
    raw: Option<&str>,
    flag: &str,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match raw {
        None => Ok(None),
        Some(s) => {
            let code = s.trim().replace('-', "_").to_uppercase();
            serde_json::from_value(Value::String(code))
                .map(Some)
                .map_err(|_| format!("{} has unrecognised value '{}'", flag, s).into())
        }
    }
}
