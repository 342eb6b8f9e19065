use napi::Result as NapiResult;
use napi_derive::napi;

use sacco_lending_core::amortization::{affordability, schedule};
use sacco_lending_core::applicant;
use sacco_lending_core::evaluation::{self, LendingPolicy};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: schedule::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::compute_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn max_affordable_principal(input_json: String) -> NapiResult<String> {
    let input: affordability::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = affordability::calculate_affordability(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Scores an application. Without `policy_json` the built-in policy applies;
/// a supplied policy is validated first.
#[napi]
pub fn evaluate_loan_application(
    input_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let criteria: evaluation::LoanEvaluationCriteria =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let policy = parse_policy(policy_json.as_deref())?;
    let output = evaluation::evaluate_loan_application(&criteria, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_lending_policy() -> NapiResult<String> {
    serde_json::to_string(&LendingPolicy::default().with_all_products()).map_err(to_napi_error)
}

fn parse_policy(policy_json: Option<&str>) -> NapiResult<LendingPolicy> {
    let policy = match policy_json {
        Some(json) => serde_json::from_str::<LendingPolicy>(json).map_err(to_napi_error)?,
        None => LendingPolicy::default(),
    };
    policy.validate().map_err(to_napi_error)?;
    Ok(policy)
}

// ---------------------------------------------------------------------------
// Applicant records
// ---------------------------------------------------------------------------

#[napi]
pub fn assemble_criteria(input_json: String) -> NapiResult<String> {
    let input: applicant::CriteriaAssemblyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = applicant::assemble_criteria(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}
