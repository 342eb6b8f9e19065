use clap::Args;
use log::{debug, info};
use serde_json::Value;

use sacco_lending_core::applicant::{self, CriteriaAssemblyInput};
use sacco_lending_core::evaluation;

use crate::input;

/// Arguments for building evaluation criteria from member records
#[derive(Args)]
pub struct AssembleArgs {
    /// Path to JSON file with request, profile, savings_accounts, loans, as_of
    #[arg(long)]
    pub input: Option<String>,

    /// Also score the assembled criteria
    #[arg(long)]
    pub evaluate: bool,

    /// Lending policy file used with --evaluate (.json, .yaml or .yml)
    #[arg(long, requires = "evaluate")]
    pub policy: Option<String>,
}

pub fn run_assemble(args: AssembleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let records: CriteriaAssemblyInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("member records read from stdin");
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for criteria assembly".into());
    };

    let assembled = applicant::assemble_criteria(&records);
    info!(
        "assembled criteria from {} savings account(s) and {} loan record(s)",
        records.savings_accounts.len(),
        records.loans.len()
    );

    if !args.evaluate {
        return Ok(serde_json::to_value(assembled)?);
    }

    let policy = input::policy::load_policy(args.policy.as_deref())?;
    let decision = evaluation::evaluate_loan_application(&assembled.result, &policy);

    let mut warnings = assembled.warnings.clone();
    warnings.extend(decision.warnings.iter().cloned());

    let mut value = serde_json::to_value(decision)?;
    if let Value::Object(ref mut map) = value {
        map.insert("criteria".to_string(), serde_json::to_value(&assembled.result)?);
        map.insert("warnings".to_string(), serde_json::to_value(warnings)?);
    }
    Ok(value)
}
