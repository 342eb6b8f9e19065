use clap::Args;
use serde_json::Value;

use crate::input;

/// Arguments for showing the effective lending policy
#[derive(Args)]
pub struct PolicyArgs {
    /// Lending policy file to validate and show (.json, .yaml or .yml)
    #[arg(long)]
    pub policy: Option<String>,

    /// Fill in built-in product rules for loan types the policy leaves out
    #[arg(long)]
    pub all_products: bool,
}

pub fn run_policy(args: PolicyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = input::policy::load_policy(args.policy.as_deref())?;
    let policy = if args.all_products {
        policy.with_all_products()
    } else {
        policy
    };
    Ok(serde_json::to_value(policy)?)
}
